use std::io::{self, Write};

use serde::Serialize;

use crate::error::{DeployError, Result};
use crate::runner::{DeploySummary, MonitorReport, RestartOutcome};

pub const FORMATS: &[&str] = &["text", "json"];

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Report {
    Deploy(DeploySummary),
    Monitor(MonitorReport),
    Restart(RestartOutcome),
}

pub fn check_format(format: &str) -> Result<()> {
    if FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(DeployError::InvalidArg(format!(
            "Unknown output format: {format}"
        )))
    }
}

pub fn print_report(format: &str, report: &Report) -> Result<()> {
    let mut out = io::stdout();
    match format {
        "text" => write_text(&mut out, report),
        "json" => write_json(&mut out, report),
        other => Err(DeployError::InvalidArg(format!(
            "Unknown output format: {other}"
        ))),
    }
}

fn write_text<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    match report {
        Report::Deploy(summary) => {
            writeln!(out, "Deploy completed")?;
            writeln!(out, "Uploaded: {}", summary.uploaded.join(", "))?;
            if !summary.skipped.is_empty() {
                writeln!(out, "Skipped:  {}", summary.skipped.join(", "))?;
            }
        }
        Report::Monitor(report) => {
            writeln!(out, "=== PM2 status ===")?;
            writeln!(out, "{}", report.status.trim_end())?;
            writeln!(out)?;
            writeln!(out, "=== Recent logs ===")?;
            writeln!(out, "{}", report.logs.trim_end())?;
            writeln!(out)?;
            writeln!(out, "=== System resources ===")?;
            writeln!(out, "{}", report.resources.trim_end())?;
        }
        Report::Restart(outcome) => {
            if outcome.restarted {
                writeln!(out, "Bot restarted")?;
                if let Some(status) = &outcome.status {
                    writeln!(out)?;
                    writeln!(out, "{}", status.trim_end())?;
                }
            } else {
                writeln!(
                    out,
                    "Restart failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                )?;
            }
        }
    }
    Ok(())
}

fn write_json<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
