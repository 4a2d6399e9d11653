use std::collections::HashMap;
use std::path::Path;

use crate::error::{DeployError, Result};
use crate::remote::{CommandOutput, RemoteShell};

/// Records every call; answers commands from a prefix table.
#[derive(Debug, Default)]
pub struct MockShell {
    pub commands: Vec<String>,
    pub uploads: Vec<(String, String)>,
    pub writes: HashMap<String, Vec<u8>>,
    responses: Vec<(String, CommandOutput)>,
    fail_on: Option<String>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, prefix: &str, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_status: if stderr.is_empty() { 0 } else { 1 },
            },
        ));
        self
    }

    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    pub fn written(&self, remote: &str) -> Option<String> {
        self.writes
            .get(remote)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl RemoteShell for MockShell {
    fn exec(&mut self, command: &str) -> Result<CommandOutput> {
        self.commands.push(command.to_string());
        if let Some(prefix) = &self.fail_on {
            if command.starts_with(prefix.as_str()) {
                return Err(DeployError::Io(std::io::Error::other("channel closed")));
            }
        }
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        self.uploads
            .push((local.display().to_string(), remote.to_string()));
        Ok(())
    }

    fn write_file(&mut self, contents: &[u8], remote: &str) -> Result<()> {
        self.writes.insert(remote.to_string(), contents.to_vec());
        Ok(())
    }
}
