//! Interactive command host: reads one script fragment per line from
//! standard input, prints any produced value to standard error prefixed
//! with `"<- "`, and prints error messages without terminating — a bad
//! line just leaves the session state as it was before that line ran.

use std::io::{self, BufRead, Write};

use wadkit::cli::{execute_line, CliState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let mut state = CliState::new();
    let stdin = io::stdin();

    loop {
        eprint!("> ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        let bytes_read = match stdin.lock().read_line(&mut line) {
            Ok(n) => n,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if bytes_read == 0 {
            break;
        }

        match execute_line(&mut state, &line) {
            Ok(Some(value)) => eprintln!("<- {value}"),
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
}
