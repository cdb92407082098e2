use std::fs;

use serde::Serialize;
use serde_json::json;

use crate::assets::{AssetKind, ClassifiedAsset};
use crate::config::MigrationOptions;
use crate::directory::list_lesson_directories;
use crate::error::LessonportError;
use crate::grouper::{SectionGrouper, SectionRecord};
use crate::plan::{DirectoryRole, LessonDraft, PlanWarning, inspect_directory};
use crate::store::{ContentStore, Fields, Link, LinkType};

pub const SECTION_CONTENT_TYPE: &str = "section";
pub const LESSON_CONTENT_TYPE: &str = "lesson";
pub const FILES_CONTENT_TYPE: &str = "files";

/// Title given to lessons flushed before any section marker was seen.
pub const UNTITLED_SECTION: &str = "Untitled section";

const ASSET_CONTENT_TYPE: &str = "text/plain";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LessonSummary {
    pub directory: String,
    pub id: String,
    pub name: String,
    pub files_id: String,
    pub assets: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub id: String,
    pub title: String,
    /// Lesson entry ids in link order.
    pub lessons: Vec<String>,
}

/// Outcome of a completed migration run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub sections: Vec<SectionSummary>,
    pub lessons: Vec<LessonSummary>,
    pub warnings: Vec<PlanWarning>,
}

/// Walks the lesson root and writes sections, lessons, files entries, and assets to the
/// store, one call at a time.
///
/// The first failing store call aborts the run; nothing already written is rolled back.
pub struct Migration<'a, S: ContentStore> {
    store: &'a S,
    options: &'a MigrationOptions,
}

impl<'a, S: ContentStore> Migration<'a, S> {
    pub fn new(store: &'a S, options: &'a MigrationOptions) -> Self {
        Self { store, options }
    }

    pub fn run(&self) -> Result<MigrationReport, LessonportError> {
        let directories = list_lesson_directories(&self.options.root)?;
        tracing::info!(
            root = %self.options.root.display(),
            count = directories.len(),
            "found lesson directories"
        );

        let mut report = MigrationReport::default();
        let mut grouper = SectionGrouper::new();

        for (index, name) in directories.iter().enumerate() {
            tracing::info!(directory = %name, index, "processing directory");
            let plan = inspect_directory(self.options, name, index)?;
            report.warnings.extend(plan.warnings);

            match plan.role {
                DirectoryRole::Section(heading) => {
                    tracing::info!(directory = %name, title = ?heading.title, "section boundary");
                    if let Some(record) = grouper.begin_section(heading) {
                        self.write_section(record, &mut report)?;
                    }
                }
                DirectoryRole::Lesson(draft) => {
                    let lesson = self.write_lesson(name, &draft, &mut report.warnings)?;
                    grouper.push_lesson(lesson.id.clone());
                    report.lessons.push(lesson);
                }
            }
            tracing::info!(directory = %name, "finished directory");
        }

        if let Some(record) = grouper.finish() {
            self.write_section(record, &mut report)?;
        }

        Ok(report)
    }

    fn write_section(
        &self,
        record: SectionRecord<String>,
        report: &mut MigrationReport,
    ) -> Result<(), LessonportError> {
        let title = match &record.title {
            Some(title) => title.clone(),
            None => {
                report.warnings.push(PlanWarning::emit(
                    "-",
                    format!(
                        "no section title for {} lesson(s) (no section marker yet, or the \
                         section text has no heading); using '{UNTITLED_SECTION}'",
                        record.lessons.len()
                    ),
                ));
                UNTITLED_SECTION.to_string()
            }
        };

        let links: Vec<Link> = record.lessons.iter().map(Link::entry).collect();
        let fields = Fields::new(&self.options.locale)
            .with("title", title.clone())
            .with("description", record.description_text())
            .with_serialized("lessons", &links)?;

        let entry = self.store.create_entry(SECTION_CONTENT_TYPE, &fields)?;
        self.store.publish_entry(&entry)?;
        tracing::info!(id = entry.id(), %title, lessons = links.len(), "published section");

        report.sections.push(SectionSummary {
            id: entry.id().to_string(),
            title,
            lessons: record.lessons,
        });
        Ok(())
    }

    fn write_lesson(
        &self,
        directory: &str,
        draft: &LessonDraft,
        warnings: &mut Vec<PlanWarning>,
    ) -> Result<LessonSummary, LessonportError> {
        tracing::info!(directory, files = draft.assets.len(), "uploading files");

        let mut files = Fields::new(&self.options.locale).with("title", draft.files_title.clone());
        let mut uploaded = 0;
        for kind in AssetKind::ALL {
            let mut links = Vec::new();
            for asset in draft.assets.bucket(kind) {
                if let Some(link) = self.upload_asset(directory, asset, warnings)? {
                    links.push(link);
                }
            }
            uploaded += links.len();
            files = files.with_serialized(kind.segment(), &links)?;
        }

        let files_entry = self.store.create_entry(FILES_CONTENT_TYPE, &files)?;
        self.store.publish_entry(&files_entry)?;
        tracing::info!(directory, id = files_entry.id(), "published files entry");

        let lesson_fields = Fields::new(&self.options.locale)
            .with("lessonName", draft.name.clone())
            .with("lessonContent", draft.content.clone())
            .with("lessonDescription", self.options.lesson_description.clone())
            .with_serialized("files", &files_entry.link(LinkType::Entry))?;
        let lesson_entry = self.store.create_entry(LESSON_CONTENT_TYPE, &lesson_fields)?;
        self.store.publish_entry(&lesson_entry)?;
        tracing::info!(directory, id = lesson_entry.id(), name = %draft.name, "published lesson");

        Ok(LessonSummary {
            directory: directory.to_string(),
            id: lesson_entry.id().to_string(),
            name: draft.name.clone(),
            files_id: files_entry.id().to_string(),
            assets: uploaded,
        })
    }

    /// Uploads one file and publishes it as an asset. Empty files are skipped.
    fn upload_asset(
        &self,
        directory: &str,
        asset: &ClassifiedAsset,
        warnings: &mut Vec<PlanWarning>,
    ) -> Result<Option<Link>, LessonportError> {
        let metadata = fs::metadata(&asset.path)?;
        if metadata.len() == 0 {
            warnings.push(PlanWarning::emit(
                directory,
                format!("file is empty, skipping upload: {}", asset.path.display()),
            ));
            return Ok(None);
        }

        tracing::info!(directory, file = %asset.display_name, "uploading file");
        let bytes = fs::read(&asset.path)?;
        let upload = self.store.create_upload(&bytes)?;

        let fields = Fields::new(&self.options.locale)
            .with("title", asset.display_name.clone())
            .with(
                "file",
                json!({
                    "contentType": ASSET_CONTENT_TYPE,
                    "fileName": asset.display_name,
                    "uploadFrom": upload.link(LinkType::Upload),
                }),
            );
        let created = self.store.create_asset(&fields)?;

        self.store.process_asset(&created, &self.options.locale)?;
        let latest = self.store.get_asset(created.id())?;
        self.store.publish_asset(&latest)?;
        tracing::debug!(id = created.id(), path = %asset.path.display(), "published asset");

        Ok(Some(created.link(LinkType::Asset)))
    }
}

/// Runs a full migration of `options.root` into `store`.
pub fn migrate<S: ContentStore>(
    store: &S,
    options: &MigrationOptions,
) -> Result<MigrationReport, LessonportError> {
    Migration::new(store, options).run()
}
