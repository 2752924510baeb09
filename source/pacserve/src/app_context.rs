//! Wires the CLI, the TOML config, the catalogue store, and the pingora
//! server together into the runnable set `main.rs` drives.

use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use pacserve_config::cli::BANNER;
use pacserve_config::{pidfile, Cli, Config};
use pingora::server::configuration::{Opt as PingoraOpt, ServerConf as PingoraServerConf};
use pingora::server::Server;
use pingora::services::Service;

use crate::catalogue::{CatalogueStore, StoreConfig};
use crate::http::PacProxyService;
use crate::render::{self, RenderParams};

pub struct AppContext {
    config: Config,
    store: Arc<CatalogueStore>,
    server: Server,
}

impl AppContext {
    /// Parses the CLI and loads the TOML config, before anything else
    /// (in particular before `tracing` is initialised, since the
    /// access-log file layer needs `config.access_log_file` to set up).
    pub async fn load_cli_and_config() -> miette::Result<(Cli, Config)> {
        let command = Cli::command().before_help(BANNER).get_matches();
        let cli = Cli::from_arg_matches(&command).expect("Failed to parse args");

        let mut config = Config::load(&cli.config)
            .await
            .map_err(|e| miette::miette!("{e}"))?;
        config.apply_cli(&cli);
        config.validate().map_err(|e| miette::miette!("{e}"))?;

        Ok((cli, config))
    }

    pub async fn bootstrap(cli: Cli, config: Config) -> miette::Result<AppContext> {
        tracing::info!(config_path = %cli.config.display(), "configuration loaded");

        if let Some(pid_file) = &config.pid_file {
            pidfile::check_stale(pid_file).map_err(|e| miette::miette!("{e}"))?;
        }

        let default_pac_text = Self::render_default_pac(&config).await;

        let store = Arc::new(CatalogueStore::new(StoreConfig {
            zone_file: config.zone_file.clone(),
            template_dir: config.pac_root.clone(),
            contact_info: config.contact_info.clone(),
            default_pac_text,
            wpad_filename: config.wpad_file.clone(),
        }));

        let strict = !config.ignore_minors || cli.validate_configs;
        let problems = store
            .init(!strict)
            .await
            .map_err(|e| miette::miette!("{e}"))?;

        if cli.validate_configs {
            if problems > 0 {
                return Err(miette::miette!(
                    "{problems} minor problems found while validating the configuration"
                ));
            }
            tracing::info!("configuration validated successfully");
            std::process::exit(0);
        }

        if let Some(pid_file) = &config.pid_file {
            pidfile::write(pid_file)
                .map_err(|e| miette::miette!("failed to write PID file: {e}"))?;
        }

        // We don't expose pingora's own upgrade/daemonize/KDL machinery;
        // those are teacher-stack concerns this server doesn't need.
        let pingora_opt = PingoraOpt {
            upgrade: false,
            daemon: false,
            nocapture: false,
            test: false,
            conf: None,
        };
        let pingora_conf = PingoraServerConf {
            pid_file: config
                .pid_file
                .clone()
                .unwrap_or_else(|| "/tmp/pacserve.pidfile".into())
                .to_string_lossy()
                .into(),
            ..PingoraServerConf::default()
        };
        let server = Server::new_with_opt_and_conf(pingora_opt, pingora_conf);

        Ok(AppContext {
            config,
            store,
            server,
        })
    }

    /// The root element's PAC text when no explicit `0.0.0.0/0` zone is
    /// configured. A missing or unrenderable default file is a minor
    /// annoyance, not a startup failure: the server falls back to an
    /// empty default and keeps serving 200 OK everywhere else.
    async fn render_default_pac(config: &Config) -> String {
        let path = config.pac_root.join(&config.default_pac_file);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "default PAC file unreadable, falling back to an empty default");
                return String::new();
            }
        };

        let params = RenderParams {
            filename: &config.default_pac_file,
            contact: &config.contact_info,
        };
        match render::render(&config.default_pac_file, &raw, &params) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "default PAC template failed to render, falling back to an empty default");
                String::new()
            }
        }
    }

    pub fn build_services(&self) -> Vec<Box<dyn Service>> {
        let mut service = pingora_proxy::http_proxy_service_with_name(
            &self.server.configuration,
            PacProxyService::new(self.store.clone()),
            "pacserve",
        );
        service.add_tcp(&self.config.listen_addr);

        vec![Box::new(service)]
    }

    pub fn ready(self) -> (Server, Arc<CatalogueStore>, Config) {
        (self.server, self.store, self.config)
    }
}
