//! Configuration sourced from the CLI.

use std::path::PathBuf;

use clap::Parser;

pub const BANNER: &str = r#"
   ____  ___   ______   ________ _______    ____
  / __ \/   | / ____/  / ___/ -_) __/ \ \  / / _ \
 / /_/ / /| |/ /       \__ \ _\ \_/ /   \ \/ /  __/
 / .___/ ___ /____/     /____/___/_/     \__/\___/
/_/   /_/  |_|
     PAC distribution server
"#;

#[derive(Parser, Debug)]
#[command(version, about = "Serve Proxy Auto-Configuration scripts by client network")]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "/etc/pacserve/pacserve.toml")]
    pub config: PathBuf,

    /// Load, validate and render the catalogue once, then exit
    /// non-zero on any minor problem instead of starting the server.
    #[arg(long)]
    pub validate_configs: bool,

    /// Override the config file's `pid_file` setting.
    #[arg(long)]
    pub pidfile: Option<PathBuf>,

    /// Override the config file's `listen_addr` setting.
    #[arg(long)]
    pub listen: Option<String>,

    /// Treat minor problems found during the first catalogue build as
    /// fatal, overriding the config file's `ignore_minors` setting.
    #[arg(long)]
    pub strict: bool,
}
