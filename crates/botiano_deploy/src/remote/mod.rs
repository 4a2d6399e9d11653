use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod ssh;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

/// An authenticated remote shell: command execution plus file transfer.
pub trait RemoteShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput>;
    fn upload(&mut self, local: &Path, remote: &str) -> Result<()>;
    fn write_file(&mut self, contents: &[u8], remote: &str) -> Result<()>;
}

/// Runs `command` once. Anything on stderr is logged as a warning and
/// otherwise ignored; callers that care inspect the returned output.
pub fn run<S: RemoteShell + ?Sized>(shell: &mut S, command: &str) -> Result<CommandOutput> {
    debug!(%command, "Running remote command");
    let output = shell.exec(command)?;
    if !output.stderr.trim().is_empty() {
        warn!(
            %command,
            exit_status = output.exit_status,
            stderr = %output.stderr.trim(),
            "Remote command wrote to stderr"
        );
    }
    Ok(output)
}
