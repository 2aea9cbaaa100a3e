//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use courseplan_cli::CliError;

fn main() {
    courseplan_cli::init_logging();
    if let Err(err) = courseplan_cli::run() {
        if let CliError::ArgumentParsing(parse_error) = &err {
            parse_error.exit();
        }
        eprintln!("courseplan: {err}");
        std::process::exit(err.class().exit_code());
    }
}
