use std::path::Path;
use std::process::ExitCode;

use lessonport::{
    AssetBuckets, DirectoryPlan, DirectoryRole, MigrationReport, PlanWarning, StoreCall,
};

use crate::commands::CommandResult;
use crate::error::CliError;
use crate::util;

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as human-readable text or a single JSON document and
/// reports success.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::SUCCESS)
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::Scan { root, directories } => {
            println!("Lesson root: {root} ({} directories)", directories.len());
            for plan in directories {
                print_plan(Path::new(root), plan);
            }
        }
        CommandResult::Migration {
            root,
            dry_run,
            report,
            calls,
        } => {
            if *dry_run {
                println!(
                    "Dry run for {root}: recorded {} store calls",
                    calls.len()
                );
                for call in calls {
                    println!("  {}", describe_call(call));
                }
            } else {
                println!("Migrated {root}");
            }
            print_report(report);
        }
    }
}

fn print_plan(root: &Path, plan: &DirectoryPlan) {
    match &plan.role {
        DirectoryRole::Section(heading) => {
            let title = heading.title.as_deref().unwrap_or("(untitled)");
            println!("  [section] {}: {title}", plan.name);
        }
        DirectoryRole::Lesson(draft) => {
            println!(
                "  [lesson] {}: {} ({})",
                plan.name,
                draft.name,
                bucket_counts(&draft.assets)
            );
            for asset in draft.assets.iter() {
                println!(
                    "    {:?} {}",
                    asset.kind,
                    util::root_relative(root, &asset.path)
                );
            }
        }
    }
    for warning in &plan.warnings {
        println!("    ! {}", warning.message);
    }
}

fn bucket_counts(assets: &AssetBuckets) -> String {
    format!(
        "source: {}, template: {}, solution: {}",
        assets.source.len(),
        assets.template.len(),
        assets.solution.len()
    )
}

fn print_report(report: &MigrationReport) {
    println!(
        "Lessons: {}, sections: {}",
        report.lessons.len(),
        report.sections.len()
    );
    for section in &report.sections {
        println!(
            "  Section '{}' ({}): {} lessons",
            section.title,
            section.id,
            section.lessons.len()
        );
    }
    print_warnings(&report.warnings);
}

fn print_warnings(warnings: &[PlanWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("Warnings ({}):", warnings.len());
    for warning in warnings {
        println!("  - [{}] {}", warning.directory, warning.message);
    }
}

fn describe_call(call: &StoreCall) -> String {
    match call {
        StoreCall::CreateEntry {
            content_type, id, ..
        } => format!("create {content_type} entry {id}"),
        StoreCall::PublishEntry { id, version } => format!("publish entry {id} (v{version})"),
        StoreCall::GetEntry { id } => format!("get entry {id}"),
        StoreCall::CreateUpload { id, bytes } => format!("upload {id} ({bytes} bytes)"),
        StoreCall::CreateAsset { id, .. } => format!("create asset {id}"),
        StoreCall::ProcessAsset { id, locale } => format!("process asset {id} [{locale}]"),
        StoreCall::GetAsset { id } => format!("get asset {id}"),
        StoreCall::PublishAsset { id, version } => format!("publish asset {id} (v{version})"),
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = serde_json::to_string(result)?;
    println!("{payload}");
    Ok(())
}
