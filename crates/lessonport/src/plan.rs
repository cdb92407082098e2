use serde::Serialize;

use crate::assets::{AssetBuckets, SkipReason, classify};
use crate::config::MigrationOptions;
use crate::content::{SectionHeading, first_heading, section_heading};
use crate::directive::{ParsedDirective, extract};
use crate::directory::{
    LessonDirectory, list_lesson_directories, load_lesson_directory, read_text_lossy,
};
use crate::error::LessonportError;

/// Lesson body used when the content include is missing, unreadable, or blank.
pub const NO_CONTENT_FALLBACK: &str = "No content available.";

/// Recoverable problem found while inspecting a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanWarning {
    pub directory: String,
    pub message: String,
}

impl PlanWarning {
    pub(crate) fn emit(directory: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!(directory, "{message}");
        Self {
            directory: directory.to_string(),
            message,
        }
    }
}

/// Everything needed to write one lesson and its files entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LessonDraft {
    pub name: String,
    pub content: String,
    /// False when `content` is the fallback text.
    pub has_content: bool,
    /// Title of the lesson's `files` entry: `{root}/{directory}`.
    pub files_title: String,
    pub assets: AssetBuckets,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DirectoryRole {
    Section(SectionHeading),
    Lesson(LessonDraft),
}

/// What a single lesson directory turns into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectoryPlan {
    pub name: String,
    pub index: usize,
    pub directive: ParsedDirective,
    pub role: DirectoryRole,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<PlanWarning>,
}

impl DirectoryPlan {
    pub fn is_section(&self) -> bool {
        matches!(self.role, DirectoryRole::Section(_))
    }
}

fn read_readme(
    options: &MigrationOptions,
    directory: &LessonDirectory,
    warnings: &mut Vec<PlanWarning>,
) -> Result<String, LessonportError> {
    if let Some(readme) = &directory.readme {
        if directory.readme_lossy {
            warnings.push(PlanWarning::emit(
                &directory.name,
                "README is not valid UTF-8; invalid bytes were replaced",
            ));
        }
        return Ok(readme.clone());
    }

    let path = LessonDirectory::readme_path(&options.root, &directory.name);
    if options.strict {
        return Err(LessonportError::Content(format!(
            "missing README for lesson directory {} ({})",
            directory.name,
            path.display()
        )));
    }
    warnings.push(PlanWarning::emit(
        &directory.name,
        format!("README not found at {}; using fallback content", path.display()),
    ));
    Ok(String::new())
}

fn read_content(
    name: &str,
    directive: &ParsedDirective,
    warnings: &mut Vec<PlanWarning>,
) -> Result<Option<String>, LessonportError> {
    let Some(target) = &directive.content else {
        warnings.push(PlanWarning::emit(name, "no content directive found"));
        return Ok(None);
    };

    if !target.resolved.is_file() {
        warnings.push(PlanWarning::emit(
            name,
            format!("content file not found: {}", target.resolved.display()),
        ));
        return Ok(None);
    }

    let (content, lossy) = read_text_lossy(&target.resolved)?;
    if lossy {
        warnings.push(PlanWarning::emit(
            name,
            format!(
                "content file is not valid UTF-8; invalid bytes were replaced: {}",
                target.resolved.display()
            ),
        ));
    }
    if content.trim().is_empty() {
        warnings.push(PlanWarning::emit(
            name,
            format!("content file is empty: {}", target.resolved.display()),
        ));
        return Ok(None);
    }
    Ok(Some(content))
}

fn lesson_draft(
    options: &MigrationOptions,
    name: &str,
    directive: &ParsedDirective,
    content: Option<String>,
    warnings: &mut Vec<PlanWarning>,
) -> LessonDraft {
    let heading = content.as_deref().and_then(first_heading);
    if content.is_some() && heading.is_none() {
        warnings.push(PlanWarning::emit(
            name,
            "lesson content has no heading; using fallback name",
        ));
    }

    let assets = classify(&directive.code_paths(), &directive.root);
    for skipped in &assets.skipped {
        let reason = match skipped.reason {
            SkipReason::Missing => "referenced file does not exist",
            SkipReason::Unclassified => "file is not under source/, template/ or solution/",
        };
        warnings.push(PlanWarning::emit(
            name,
            format!("skipping {}: {reason}", skipped.path.display()),
        ));
    }

    LessonDraft {
        name: heading.unwrap_or_else(|| format!("Lesson {name}")),
        has_content: content.is_some(),
        content: content.unwrap_or_else(|| NO_CONTENT_FALLBACK.to_string()),
        files_title: format!("{}/{}", options.root.display(), name),
        assets,
    }
}

/// Reads a lesson directory and decides whether it is a section marker or a lesson.
///
/// A missing README is fatal in strict mode and a warning otherwise.
pub fn inspect_directory(
    options: &MigrationOptions,
    name: &str,
    index: usize,
) -> Result<DirectoryPlan, LessonportError> {
    let directory = load_lesson_directory(&options.root, name, index)?;
    let mut warnings = Vec::new();

    let readme = read_readme(options, &directory, &mut warnings)?;
    let directive = extract(&readme, &options.root, index);
    tracing::info!(
        directory = name,
        content = ?directive.content.as_ref().map(|t| &t.resolved),
        files = directive.code.len(),
        "parsed directives"
    );

    let content = read_content(name, &directive, &mut warnings)?;
    let section_marker = directive
        .content
        .as_ref()
        .is_some_and(|target| target.is_section_marker());

    let role = match content {
        Some(text) if section_marker => {
            let heading = section_heading(&text);
            if heading.title.is_none() {
                warnings.push(PlanWarning::emit(name, "section text has no heading"));
            }
            DirectoryRole::Section(heading)
        }
        content => DirectoryRole::Lesson(lesson_draft(
            options,
            name,
            &directive,
            content,
            &mut warnings,
        )),
    };

    Ok(DirectoryPlan {
        name: name.to_string(),
        index,
        directive,
        role,
        warnings,
    })
}

/// Inspects every lesson directory under the root, in numeric order, without writing
/// anything anywhere.
pub fn scan(options: &MigrationOptions) -> Result<Vec<DirectoryPlan>, LessonportError> {
    let directories = list_lesson_directories(&options.root)?;
    tracing::info!(
        root = %options.root.display(),
        count = directories.len(),
        "found lesson directories"
    );

    directories
        .iter()
        .enumerate()
        .map(|(index, name)| inspect_directory(options, name, index))
        .collect()
}
