use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DeployError, Result};
use crate::pm2::{self, Ecosystem};
use crate::remote::{RemoteShell, run};

/// Name of the bot binary on the remote host.
pub const BOT_BINARY: &str = "botiano";

/// Files pushed on deploy when no `--file` is given.
pub const DEFAULT_MANIFEST: &[&str] = &["target/release/botiano", ".env", "faq.jsonl"];

#[derive(Debug, Clone)]
pub struct Target {
    pub remote_dir: String,
    pub bot_name: String,
}

impl Target {
    fn remote_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.remote_dir.trim_end_matches('/'))
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeploySummary {
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    pub status: String,
    pub logs: String,
    pub resources: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RestartOutcome {
    pub restarted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DeployError::InvalidArg(format!("not a file path: {}", path.display())))
}

/// Pushes the manifest, installs PM2 and (re)starts the bot under it.
/// Manifest entries missing locally are skipped with a warning.
pub fn deploy<S: RemoteShell + ?Sized>(
    shell: &mut S,
    target: &Target,
    files: &[PathBuf],
) -> Result<DeploySummary> {
    info!(bot = %target.bot_name, dir = %target.remote_dir, "Deploying");
    run(shell, &pm2::mkdir(&target.remote_dir))?;

    let mut summary = DeploySummary::default();
    for path in files {
        let name = file_name(path)?;
        if !path.exists() {
            warn!(file = %path.display(), "File does not exist, skipping");
            summary.skipped.push(path.display().to_string());
            continue;
        }
        let remote = target.remote_path(name);
        info!(file = %path.display(), %remote, "Uploading");
        shell.upload(path, &remote)?;
        summary.uploaded.push(name.to_string());
    }

    info!("Installing dependencies");
    run(shell, pm2::INSTALL_PM2)?;
    if summary.uploaded.iter().any(|name| name == BOT_BINARY) {
        run(shell, &pm2::make_executable(&target.remote_path(BOT_BINARY)))?;
    }

    info!("Configuring PM2");
    run(shell, &pm2::mkdir(&target.remote_path("logs")))?;
    let ecosystem = Ecosystem::for_binary(&target.bot_name, &target.remote_dir, BOT_BINARY);
    shell.write_file(
        ecosystem.to_json()?.as_bytes(),
        &target.remote_path(pm2::ECOSYSTEM_FILE),
    )?;
    run(shell, &pm2::start(&target.remote_dir, &target.bot_name))?;
    run(shell, pm2::SAVE_AND_STARTUP)?;

    info!(uploaded = summary.uploaded.len(), skipped = summary.skipped.len(), "Deploy finished");
    Ok(summary)
}

pub fn monitor<S: RemoteShell + ?Sized>(shell: &mut S, target: &Target) -> Result<MonitorReport> {
    info!(bot = %target.bot_name, "Collecting status");
    Ok(MonitorReport {
        status: run(shell, pm2::STATUS)?.stdout,
        logs: run(shell, &pm2::logs(&target.bot_name))?.stdout,
        resources: run(shell, pm2::RESOURCES)?.stdout,
    })
}

/// Anything on stderr from `pm2 restart` counts as a failed restart.
pub fn restart<S: RemoteShell + ?Sized>(shell: &mut S, target: &Target) -> Result<RestartOutcome> {
    info!(bot = %target.bot_name, "Restarting");
    let output = run(shell, &pm2::restart(&target.bot_name))?;
    if !output.stderr.trim().is_empty() {
        return Ok(RestartOutcome {
            restarted: false,
            status: None,
            error: Some(output.stderr.trim().to_string()),
        });
    }

    let status = run(shell, pm2::STATUS)?.stdout;
    Ok(RestartOutcome {
        restarted: true,
        status: Some(status),
        error: None,
    })
}
