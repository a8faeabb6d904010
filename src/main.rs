//! sidx CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The JSON response
//! (success or error) is already on stdout when `run` returns; a failure
//! is repeated on stderr and turned into a non-zero exit.

use sidx::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
