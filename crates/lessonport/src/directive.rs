use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Directory segment that marks an included file as section text rather than a lesson.
pub const SECTION_SEGMENT: &str = "section";

/// A path referenced by a README directive, kept both as written and as resolved on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectiveTarget {
    /// Path as written in the directive, relative to the lesson directory.
    pub relative: PathBuf,
    /// `{parent}/{index}/{relative}`.
    pub resolved: PathBuf,
}

impl DirectiveTarget {
    fn new(root: &Path, relative: &str) -> Self {
        let relative = PathBuf::from(relative);
        Self {
            resolved: root.join(&relative),
            relative,
        }
    }

    /// True when one of the directories above the file is the reserved section segment.
    pub fn is_section_marker(&self) -> bool {
        let mut segments: Vec<_> = self
            .relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .collect();
        segments.pop();
        segments.iter().any(|segment| *segment == SECTION_SEGMENT)
    }
}

/// Directives found in a single lesson README.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDirective {
    /// `{parent}/{index}`, the directory every target was resolved against.
    pub root: PathBuf,
    pub content: Option<DirectiveTarget>,
    pub code: Vec<DirectiveTarget>,
}

impl ParsedDirective {
    pub fn code_paths(&self) -> Vec<PathBuf> {
        self.code.iter().map(|target| target.resolved.clone()).collect()
    }
}

fn content_regex() -> &'static Regex {
    static CONTENT_REGEX: OnceLock<Regex> = OnceLock::new();
    CONTENT_REGEX.get_or_init(|| {
        Regex::new(r"\[filename\]\((.*?) ':include'\)").expect("Invalid content directive regex")
    })
}

fn code_regex() -> &'static Regex {
    static CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    CODE_REGEX.get_or_init(|| {
        Regex::new(r"\[\./(.*?)\]\(.*? ':include :type=code .*?'\)")
            .expect("Invalid code directive regex")
    })
}

/// Extracts the content include and the code includes from a lesson README.
///
/// Targets resolve against `{parent}/{index}`. Absent or malformed directives simply
/// produce no target.
pub fn extract(markdown: &str, parent: &Path, index: usize) -> ParsedDirective {
    let root = parent.join(index.to_string());

    let content = content_regex()
        .captures(markdown)
        .and_then(|cap| cap.get(1))
        .map(|m| {
            let raw = m.as_str();
            let relative = raw.strip_prefix("./").unwrap_or(raw);
            DirectiveTarget::new(&root, relative)
        });

    let code = code_regex()
        .captures_iter(markdown)
        .filter_map(|cap| cap.get(1))
        .map(|m| DirectiveTarget::new(&root, m.as_str()))
        .collect();

    ParsedDirective {
        root,
        content,
        code,
    }
}
