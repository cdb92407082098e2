use std::path::PathBuf;

use clap::ArgMatches;
use lessonport::MigrationOptions;

use crate::error::{CliError, ExitStatus};
use crate::util::Verbosity;

pub struct CliSession {
    pub options: MigrationOptions,
    pub verbosity: Verbosity,
}

impl CliSession {
    pub fn bootstrap(matches: &ArgMatches, verbosity: Verbosity) -> Result<Self, CliError> {
        let root = matches
            .get_one::<String>("root")
            .map(PathBuf::from)
            .ok_or_else(|| {
                CliError::new(
                    "missing lesson root: pass --root or set PARENT_DIR",
                    ExitStatus::Usage,
                )
            })?;

        if !root.is_dir() {
            return Err(CliError::new(
                format!("lesson root {} is not a directory", root.display()),
                ExitStatus::Usage,
            ));
        }

        let mut options = MigrationOptions::new(root);
        if let Some(locale) = matches.get_one::<String>("locale") {
            options.locale = locale.clone();
        }
        options.strict = matches.get_flag("strict");

        Ok(Self { options, verbosity })
    }
}
