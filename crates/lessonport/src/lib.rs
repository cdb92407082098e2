pub mod assets;
pub mod config;
pub mod content;
pub mod contentful;
pub mod directive;
pub mod directory;
pub mod error;
pub mod grouper;
pub mod migrate;
pub mod plan;
pub mod store;

pub use assets::{AssetBuckets, AssetKind, ClassifiedAsset, SkipReason, SkippedAsset, classify};
pub use config::{
    CmsCredentials, ContentfulEndpoints, DEFAULT_API_URL, DEFAULT_ENVIRONMENT, DEFAULT_LOCALE,
    DEFAULT_UPLOAD_URL, MigrationOptions, mask_token,
};
pub use content::{SectionHeading, first_heading, section_heading};
pub use contentful::ContentfulStore;
pub use directive::{DirectiveTarget, ParsedDirective, extract};
pub use directory::{
    LessonDirectory, list_lesson_directories, load_lesson_directory, read_text_lossy,
};
pub use error::LessonportError;
pub use grouper::{SectionGrouper, SectionRecord};
pub use migrate::{LessonSummary, Migration, MigrationReport, SectionSummary, migrate};
pub use plan::{DirectoryPlan, DirectoryRole, LessonDraft, PlanWarning, inspect_directory, scan};
pub use store::{ContentStore, Fields, Link, LinkType, RecordingStore, Resource, StoreCall, Sys};
