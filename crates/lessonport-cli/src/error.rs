use std::fmt;
use std::process::ExitCode;

use lessonport::LessonportError;

const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_UNAVAILABLE: u8 = 69;
const EX_SOFTWARE: u8 = 70;
const EX_OSERR: u8 = 71;
const EX_CONFIG: u8 = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Usage,
    Data,
    Unavailable,
    Io,
    Config,
    Software,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Usage => EX_USAGE,
            ExitStatus::Data => EX_DATAERR,
            ExitStatus::Unavailable => EX_UNAVAILABLE,
            ExitStatus::Io => EX_OSERR,
            ExitStatus::Config => EX_CONFIG,
            ExitStatus::Software => EX_SOFTWARE,
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    message: String,
    status: ExitStatus,
}

impl CliError {
    pub fn new(message: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status.code())
    }

    pub fn print(&self) {
        eprintln!("{}", self.message);
    }
}

impl From<LessonportError> for CliError {
    fn from(err: LessonportError) -> Self {
        let status = match &err {
            LessonportError::Config(_) => ExitStatus::Config,
            LessonportError::Content(_) => ExitStatus::Data,
            LessonportError::Remote(_) | LessonportError::RemoteStatus { .. } => {
                ExitStatus::Unavailable
            }
            LessonportError::Serialization(_) => ExitStatus::Software,
            LessonportError::Io(_) => ExitStatus::Io,
        };
        CliError::new(err.to_string(), status)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Usage)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Io)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Software)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_sysexits() {
        let cases = [
            (LessonportError::Config("missing space id".into()), 78),
            (LessonportError::Content("missing README".into()), 65),
            (LessonportError::Remote("connection refused".into()), 69),
            (
                LessonportError::RemoteStatus {
                    status: 401,
                    message: "unauthorized".into(),
                },
                69,
            ),
            (LessonportError::Serialization("bad json".into()), 70),
        ];
        for (err, code) in cases {
            let cli = CliError::from(err);
            assert_eq!(cli.status.code(), code, "{cli}");
        }
    }
}
