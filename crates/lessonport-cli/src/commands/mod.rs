use lessonport::{DirectoryPlan, MigrationReport, StoreCall};
use serde::Serialize;

pub mod migrate;
pub mod scan;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    Scan {
        root: String,
        directories: Vec<DirectoryPlan>,
    },
    Migration {
        root: String,
        dry_run: bool,
        report: MigrationReport,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        calls: Vec<StoreCall>,
    },
}
