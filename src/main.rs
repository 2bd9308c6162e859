//! # watch
//!
//! Compiles a `Watchfile` (or the script given as the first argument) into
//! shell commands and runs them in order.
//!
//! ## Usage
//!
//! - Run the nearest Watchfile: `watch`
//! - Run a specific script: `watch deps.watch`
//! - Show the commands without running them: `watch --dry-run`

/// Entry point for the CLI tool.
fn main() {
    watch::cli::run_cli();
}
