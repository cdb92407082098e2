use clap::{ArgMatches, Command};
use lessonport::scan;

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("scan")
        .about("Preview how each lesson directory would be migrated without contacting the CMS")
}

pub fn run(session: &CliSession, _matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let directories = scan(&session.options)?;
    Ok(CommandResult::Scan {
        root: session.options.root.display().to_string(),
        directories,
    })
}
