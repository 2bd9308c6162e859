// Runs a compiled command list through the shell

use std::process::{Command, Stdio};

use crate::error::{Error, Result};

pub struct Executor {
    shell: String,
    keep_going: bool,
}

impl Executor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            keep_going: false,
        }
    }

    /// Keep running the remaining commands after one fails.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn execute(&self, commands: &[String]) -> Result<()> {
        for command in commands {
            self.execute_command(command)?;
        }
        Ok(())
    }

    fn execute_command(&self, command: &str) -> Result<()> {
        log::info!("running: {}", command);
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            if !self.keep_going {
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    status,
                });
            }
            log::warn!("command failed with {}: {}", status, command);
        }
        Ok(())
    }
}
