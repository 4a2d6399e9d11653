use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output;
use crate::remote::ssh::ConnectionConfig;
use crate::retry::RetryPolicy;
use crate::runner::{DEFAULT_MANIFEST, Target};

#[derive(Parser, Debug)]
#[command(
    name = "botiano-deploy",
    version,
    about = "Deploy, monitor and restart botiano on a remote host over SSH"
)]
pub struct Cli {
    #[arg(long, env = "SSH_IP")]
    pub host: String,

    #[arg(long, env = "SSH_PORT", default_value_t = 22)]
    pub port: u16,

    #[arg(long, env = "SSH_USER")]
    pub user: String,

    #[arg(long, env = "SSH_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Private key file; takes precedence over the password.
    #[arg(long, env = "SSH_KEY")]
    pub private_key: Option<PathBuf>,

    #[arg(long, env = "REMOTE_DIR", default_value = "/home/user/botiano")]
    pub remote_dir: String,

    #[arg(long, env = "BOT_NAME", default_value = "botiano")]
    pub bot_name: String,

    #[arg(long, default_value = "30s")]
    pub connect_timeout: humantime::Duration,

    #[arg(long, default_value_t = 3)]
    pub retry_attempts: u32,

    #[arg(long, default_value = "5s")]
    pub retry_delay: humantime::Duration,

    #[arg(long, default_value = "text")]
    pub output: String,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Upload the bot and (re)start it under PM2
    Deploy {
        /// Local file to upload; repeatable. Defaults to the release binary, .env and faq.jsonl
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Show PM2 status, recent logs and host resources
    Monitor,
    /// Restart the bot process
    Restart,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.password.is_none() && self.private_key.is_none() {
            return Err(
                "one of --password (SSH_PASS) or --private-key (SSH_KEY) is required".to_string(),
            );
        }
        if self.connect_timeout.as_ref().is_zero() {
            return Err("connect-timeout must be > 0".to_string());
        }
        if self.retry_attempts == 0 {
            return Err("retry-attempts must be > 0".to_string());
        }
        output::check_format(&self.output).map_err(|err| err.to_string())?;
        Ok(())
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            private_key: self.private_key.clone(),
            timeout: *self.connect_timeout,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts, *self.retry_delay)
    }

    pub fn target(&self) -> Target {
        Target {
            remote_dir: self.remote_dir.clone(),
            bot_name: self.bot_name.clone(),
        }
    }
}

/// Files named on the command line, or the default manifest.
pub fn manifest(files: &[PathBuf]) -> Vec<PathBuf> {
    if files.is_empty() {
        DEFAULT_MANIFEST.iter().map(PathBuf::from).collect()
    } else {
        files.to_vec()
    }
}
