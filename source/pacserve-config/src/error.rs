use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} must be set (no config-file or CLI value supplied)")]
    MissingField { field: &'static str },
    #[error("listen_addr {0:?} is not a valid socket address")]
    InvalidListenAddr(String),
    #[error("a PID file already exists at {path:?} and process {pid} is still running")]
    PidFileInUse { path: PathBuf, pid: i32 },
}
