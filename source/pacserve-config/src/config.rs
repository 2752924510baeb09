//! The TOML configuration file schema and its merge with CLI overrides.
//!
//! Field names match the on-disk TOML keys one-for-one; `serde` handles
//! the (de)serialisation, `toml` the file format, matching the teacher
//! stack's separation of "how a value got here" (CLI vs file) from
//! "what the value means" (this struct).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub zone_file: PathBuf,
    pub pac_root: PathBuf,
    pub default_pac_file: String,
    #[serde(default)]
    pub wpad_file: Option<String>,
    #[serde(default = "default_contact_info")]
    pub contact_info: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_max_cache_age_secs")]
    pub max_cache_age_secs: u64,
    #[serde(default)]
    pub ignore_minors: bool,
    #[serde(default)]
    pub pid_file: Option<PathBuf>,
    #[serde(default)]
    pub access_log_file: Option<PathBuf>,
}

fn default_contact_info() -> String {
    "your network administrator".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_cache_age_secs() -> u64 {
    300
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies CLI overrides; per the teacher convention, CLI always wins.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(pidfile) = &cli.pidfile {
            self.pid_file = Some(pidfile.clone());
        }
        if let Some(listen) = &cli.listen {
            self.listen_addr = listen.clone();
        }
        if cli.strict {
            self.ignore_minors = false;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_pac_file.is_empty() {
            return Err(ConfigError::MissingField {
                field: "default_pac_file",
            });
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidListenAddr(self.listen_addr.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_minimal_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pacserve.toml");
        std::fs::write(
            &path,
            r#"
            zone_file = "/etc/pacserve/zones.csv"
            pac_root = "/etc/pacserve/pacs"
            default_pac_file = "default.pac"
            "#,
        )
        .unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.max_cache_age_secs, 300);
        assert!(!config.ignore_minors);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_invalid_listen_addr() {
        let config = Config {
            zone_file: "/z".into(),
            pac_root: "/p".into(),
            default_pac_file: "default.pac".to_string(),
            wpad_file: None,
            contact_info: "help".to_string(),
            listen_addr: "not-an-addr".to_string(),
            max_cache_age_secs: 300,
            ignore_minors: false,
            pid_file: None,
            access_log_file: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn cli_pidfile_overrides_config_file() {
        let mut config = Config {
            zone_file: "/z".into(),
            pac_root: "/p".into(),
            default_pac_file: "default.pac".to_string(),
            wpad_file: None,
            contact_info: "help".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
            max_cache_age_secs: 300,
            ignore_minors: true,
            pid_file: Some("/var/run/old.pid".into()),
            access_log_file: None,
        };

        let cli = Cli {
            config: PathBuf::new(),
            validate_configs: false,
            pidfile: Some("/var/run/new.pid".into()),
            listen: None,
            strict: true,
        };
        config.apply_cli(&cli);

        assert_eq!(config.pid_file, Some(PathBuf::from("/var/run/new.pid")));
        assert!(!config.ignore_minors);
    }
}
