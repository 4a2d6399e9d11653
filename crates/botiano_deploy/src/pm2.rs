//! PM2 process supervisor: ecosystem file and the commands that drive it.

use serde::Serialize;

pub const ECOSYSTEM_FILE: &str = "ecosystem.config.json";
pub const INSTALL_PM2: &str = "npm list -g pm2 || npm install -g pm2";
pub const SAVE_AND_STARTUP: &str = "pm2 save && pm2 startup";
pub const STATUS: &str = "pm2 status";
pub const RESOURCES: &str = "free -h && df -h";
pub const LOG_LINES: u32 = 10;

#[derive(Debug, Serialize)]
pub struct Ecosystem<'a> {
    pub apps: Vec<App<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AppEnv {
    #[serde(rename = "RUST_LOG")]
    pub rust_log: &'static str,
}

#[derive(Debug, Serialize)]
pub struct App<'a> {
    pub name: &'a str,
    pub script: String,
    /// `none` makes PM2 exec the script directly instead of through node.
    pub interpreter: &'static str,
    pub cwd: &'a str,
    pub autorestart: bool,
    pub watch: bool,
    pub max_memory_restart: &'static str,
    pub env: AppEnv,
    pub log_date_format: &'static str,
    pub error_file: &'static str,
    pub out_file: &'static str,
    pub merge_logs: bool,
    pub time: bool,
}

impl<'a> Ecosystem<'a> {
    pub fn for_binary(name: &'a str, cwd: &'a str, binary: &str) -> Self {
        Self {
            apps: vec![App {
                name,
                script: format!("./{binary}"),
                interpreter: "none",
                cwd,
                autorestart: true,
                watch: false,
                max_memory_restart: "200M",
                env: AppEnv { rust_log: "info" },
                log_date_format: "YYYY-MM-DD HH:mm:ss",
                error_file: "logs/error.log",
                out_file: "logs/output.log",
                merge_logs: true,
                time: true,
            }],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn q(value: &str) -> String {
    shell_words::quote(value).into_owned()
}

pub fn mkdir(dir: &str) -> String {
    format!("mkdir -p {}", q(dir))
}

pub fn make_executable(path: &str) -> String {
    format!("chmod +x {}", q(path))
}

/// Replaces any running instance with one started from the ecosystem file.
pub fn start(remote_dir: &str, name: &str) -> String {
    format!(
        "cd {} && (pm2 delete {} || true) && pm2 start {ECOSYSTEM_FILE}",
        q(remote_dir),
        q(name)
    )
}

pub fn restart(name: &str) -> String {
    format!("pm2 restart {}", q(name))
}

pub fn logs(name: &str) -> String {
    format!("pm2 logs {} --lines {LOG_LINES} --nostream", q(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn ecosystem_runs_binary_without_interpreter() {
        let json = Ecosystem::for_binary("botiano", "/srv/botiano", "botiano")
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let app = &value["apps"][0];
        assert_eq!(app["name"], "botiano");
        assert_eq!(app["script"], "./botiano");
        assert_eq!(app["interpreter"], "none");
        assert_eq!(app["cwd"], "/srv/botiano");
        assert_eq!(app["max_memory_restart"], "200M");
        assert_eq!(app["env"]["RUST_LOG"], "info");
        assert_eq!(app["out_file"], "logs/output.log");
        assert_eq!(value["apps"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn commands_quote_user_supplied_values() {
        assert_eq!(mkdir("/home/user/botiano"), "mkdir -p /home/user/botiano");
        assert_eq!(mkdir("/srv/my bot"), "mkdir -p '/srv/my bot'");
        assert_eq!(restart("bot; rm -rf /"), "pm2 restart 'bot; rm -rf /'");
        assert_eq!(logs("botiano"), "pm2 logs botiano --lines 10 --nostream");
        assert_eq!(
            start("/srv/botiano", "botiano"),
            "cd /srv/botiano && (pm2 delete botiano || true) && pm2 start ecosystem.config.json"
        );
    }
}
