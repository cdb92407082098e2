use clap::{Arg, ArgAction, ArgMatches, Command};
use lessonport::{
    CmsCredentials, ContentfulEndpoints, ContentfulStore, DEFAULT_API_URL, DEFAULT_ENVIRONMENT,
    DEFAULT_UPLOAD_URL, RecordingStore, migrate,
};

use crate::commands::CommandResult;
use crate::context::CliSession;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("migrate")
        .about("Upload lesson files and create lesson, files, and section entries")
        .arg(
            Arg::new("access-token")
                .long("access-token")
                .value_name("TOKEN")
                .env("CONTENTFUL_MANAGEMENT_ACCESS_TOKEN")
                .hide_env_values(true)
                .help("Content management API token."),
        )
        .arg(
            Arg::new("space")
                .long("space")
                .value_name("SPACE_ID")
                .env("CONTENTFUL_SPACE_ID")
                .help("Space the entries are written to."),
        )
        .arg(
            Arg::new("environment")
                .long("environment")
                .value_name("ENVIRONMENT")
                .env("CONTENTFUL_ENVIRONMENT")
                .default_value(DEFAULT_ENVIRONMENT)
                .help("Environment within the space."),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .env("CONTENTFUL_API_URL")
                .default_value(DEFAULT_API_URL)
                .help("Base URL of the content management API."),
        )
        .arg(
            Arg::new("upload-url")
                .long("upload-url")
                .value_name("URL")
                .env("CONTENTFUL_UPLOAD_URL")
                .default_value(DEFAULT_UPLOAD_URL)
                .help("Base URL of the upload API."),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Record the calls that would be made instead of contacting the CMS."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let root = session.options.root.display().to_string();

    if matches.get_flag("dry-run") {
        let store = RecordingStore::new();
        let report = migrate(&store, &session.options)?;
        return Ok(CommandResult::Migration {
            root,
            dry_run: true,
            report,
            calls: store.calls(),
        });
    }

    let credentials = CmsCredentials::new(
        matches.get_one::<String>("access-token").cloned(),
        matches.get_one::<String>("space").cloned(),
        matches.get_one::<String>("environment").cloned(),
    )?;
    let endpoints = ContentfulEndpoints::parse(
        matches
            .get_one::<String>("api-url")
            .map(String::as_str)
            .unwrap_or(DEFAULT_API_URL),
        matches
            .get_one::<String>("upload-url")
            .map(String::as_str)
            .unwrap_or(DEFAULT_UPLOAD_URL),
    )?;

    let store = ContentfulStore::new(credentials, endpoints);
    store.connect()?;
    let report = migrate(&store, &session.options)?;

    Ok(CommandResult::Migration {
        root,
        dry_run: false,
        report,
        calls: Vec::new(),
    })
}
