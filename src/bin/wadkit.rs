//! Batch command host: loads a single script (a file, or `-` for standard
//! input), runs it line by line, and exits. Any value a line produces is
//! printed to standard error prefixed with `"<- "`; the first unhandled
//! error aborts the run and sets a non-zero exit code.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::Parser;
use wadkit::cli::{execute_line, CliState};

#[derive(Parser)]
#[command(name = "wadkit", about = "Batch runner for WAD/PK3 archive scripts")]
struct Args {
    /// Script file to run, or `-` to read the script from standard input.
    script: String,
}

fn read_script(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let script = match read_script(&args.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = CliState::new();
    for (lineno, line) in script.lines().enumerate() {
        log::debug!("line {}: {}", lineno + 1, line);
        match execute_line(&mut state, line) {
            Ok(Some(value)) => eprintln!("<- {value}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("line {}: {}", lineno + 1, e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
