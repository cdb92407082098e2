use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "lessonport";

pub fn run() -> ExitCode {
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments, resolves the lesson root, and dispatches to the selected
/// command. Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = match command.try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err.into()),
    };

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    init_tracing(verbosity.verbose);

    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let session = CliSession::bootstrap(&matches, verbosity)?;
    if session.verbosity.verbose {
        tracing::info!(
            root = %session.options.root.display(),
            locale = %session.options.locale,
            strict = session.options.strict,
            "resolved migration options"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Defines the root `clap::Command` tree: global flags shared by every command plus the
/// `scan` and `migrate` subcommands.
fn build_cli() -> Command {
    Command::new(NAME)
        .about("Migrate numbered course lesson directories into Contentful")
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .env("PARENT_DIR")
                .global(true)
                .help("Directory holding the numbered lesson directories."),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .value_name("LOCALE")
                .default_value(lessonport::DEFAULT_LOCALE)
                .global(true)
                .help("Locale every field value is written under."),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Fail on a lesson directory without a README."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug detail, including every request sent to the CMS."),
        )
        .subcommand_required(true)
        .subcommand(commands::scan::command())
        .subcommand(commands::migrate::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("scan", sub)) => commands::scan::run(session, sub),
        Some(("migrate", sub)) => commands::migrate::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
