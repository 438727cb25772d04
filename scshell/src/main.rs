//! `scshell`: the thin line-oriented driver over `svql_subgraph`. Reads
//! commands from standard input, writes match/mine reports to standard
//! output, and exits 1 if an `expect` command's count does not match what
//! was accumulated since the previous `expect`.

mod error;
mod shell;

use std::io::{self, Write};
use std::process::ExitCode;

use shell::Shell;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let ok = {
        let mut shell = Shell::new(&mut out);
        shell.run(stdin.lock())
    };
    let _ = out.flush();

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
