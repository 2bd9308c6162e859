// Command line entry point

use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Parser as ClapParser};
use env_logger::Env;

use crate::config::{self, Settings};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::interpreter::parse_script;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI arguments for the watch tool.
#[derive(ClapParser)]
#[command(name = "watch")]
#[command(version = PKG_VERSION)]
#[command(about = "Fetch, build and relocate dependencies from a declarative script", long_about = None)]
struct Cli {
    /// Script to run (defaults to the nearest Watchfile)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the generated commands instead of running them
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Keep running after a command fails
    #[arg(short, long)]
    keep_going: bool,

    /// Directory clones are staged under (overrides WATCH_STAGING_DIR)
    #[arg(long, value_name = "DIR")]
    staging_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Parse arguments, run the script and exit non-zero on failure.
pub fn run_cli() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e {
            // The diagnostic line is the whole message for parse errors.
            Error::Parse(err) => eprintln!("{}", err),
            e => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_env()?;
    if let Some(dir) = cli.staging_dir {
        settings.staging_root = dir;
    }

    let path = match cli.file {
        Some(path) => path,
        None => config::find_script(&settings.working_dir).ok_or(Error::ScriptNotFound)?,
    };
    let script = fs::read_to_string(&path).map_err(|source| Error::Read {
        path: path.clone(),
        source,
    })?;
    log::debug!("loaded script {}", path.display());

    let commands = parse_script(&path.to_string_lossy(), &script, &settings)?;

    if cli.dry_run {
        for command in &commands {
            println!("{}", command);
        }
        return Ok(());
    }

    Executor::new(config::shell())
        .keep_going(cli.keep_going)
        .execute(&commands)
}
