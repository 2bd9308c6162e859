// Settings for the interpreter and the executor, and script discovery

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the script looked up when no file is given on the command line.
pub const SCRIPT_NAME: &str = "Watchfile";

/// Environment inputs the interpreter needs while building commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory clones are staged under.
    pub staging_root: PathBuf,
    /// Directory a leading `.` in an extract destination stands for.
    pub working_dir: PathBuf,
}

impl Settings {
    pub fn new(staging_root: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Reads `WATCH_STAGING_DIR` (falling back to the system temp dir) and
    /// the current working directory.
    pub fn from_env() -> io::Result<Self> {
        let staging_root = env::var_os("WATCH_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);
        Ok(Self::new(staging_root, env::current_dir()?))
    }
}

/// Picks the shell commands run under: `WATCH_SHELL` if set, otherwise
/// bash on Windows and sh everywhere else.
pub fn shell() -> String {
    if let Ok(custom_shell) = env::var("WATCH_SHELL") {
        custom_shell
    } else if cfg!(target_os = "windows") {
        if which::which("bash").is_ok() {
            "bash".to_string()
        } else {
            // Default Git Bash installation path
            r"C:\Program Files\Git\bin\bash.exe".to_string()
        }
    } else {
        "sh".to_string()
    }
}

/// Searches for a Watchfile in `start` and then each of its parents.
pub fn find_script(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(SCRIPT_NAME))
        .find(|path| path.is_file())
}
