use std::process::ExitCode;

fn main() -> ExitCode {
    lessonport_cli::run()
}
