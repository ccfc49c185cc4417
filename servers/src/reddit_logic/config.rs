use anyhow::{Result, bail};
use clap::Parser;
use lib_common::sources::reddit::RedditConfig;
use lib_common::sources::reddit::apicallreddit::{DEFAULT_API_BASE_URL, DEFAULT_OAUTH_URL, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "server_reddit.conf";
pub const DEFAULT_WS_PORT: u16 = 6001;
pub const DEFAULT_HTTP_PORT: u16 = 6000;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Parser, Deserialize, Debug, Clone, Default)]
#[clap(about = "Reddit r/science live relay", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "REDDIT_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "REDDIT_CLIENT_ID", help = "Reddit application client id.")]
    pub client_id: Option<String>,

    #[clap(long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true, help = "Reddit application client secret.")]
    pub client_secret: Option<String>,

    #[clap(long, env = "REDDIT_OAUTH_URL", help = "Credential-grant endpoint.")]
    pub oauth_url: Option<String>,

    #[clap(long, env = "REDDIT_API_URL", help = "Base URL of the authenticated Reddit API.")]
    pub api_url: Option<String>,

    #[clap(long, env = "REDDIT_USER_AGENT", help = "User-Agent sent upstream.")]
    pub user_agent: Option<String>,

    #[clap(long, env = "WS_PORT", help = "Port for WebSocket clients.")]
    pub ws_port: Option<u16>,

    #[clap(long, env = "HTTP_PORT", help = "Port for the REST endpoints.")]
    pub http_port: Option<u16>,

    #[clap(long, env = "POLL_INTERVAL_SECS", help = "Seconds between pushes to each WebSocket client.")]
    pub poll_interval_secs: Option<u64>,

    #[clap(long, env = "CORS_ORIGIN", help = "Origin allowed to call the REST endpoints.")]
    pub cors_origin: Option<String>,

    #[clap(long, env = "REDDIT_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "REDDIT_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,
}

impl Config {
    // 'other' wins wherever it has a value
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            client_id: other.client_id.or(self.client_id),
            client_secret: other.client_secret.or(self.client_secret),
            oauth_url: other.oauth_url.or(self.oauth_url),
            api_url: other.api_url.or(self.api_url),
            user_agent: other.user_agent.or(self.user_agent),
            ws_port: other.ws_port.or(self.ws_port),
            http_port: other.http_port.or(self.http_port),
            poll_interval_secs: other.poll_interval_secs.or(self.poll_interval_secs),
            cors_origin: other.cors_origin.or(self.cors_origin),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
        }
    }

    fn defaults() -> Config {
        Config {
            oauth_url: Some(DEFAULT_OAUTH_URL.to_string()),
            api_url: Some(DEFAULT_API_BASE_URL.to_string()),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            ws_port: Some(DEFAULT_WS_PORT),
            http_port: Some(DEFAULT_HTTP_PORT),
            poll_interval_secs: Some(DEFAULT_POLL_INTERVAL_SECS),
            cors_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            ..Default::default()
        }
    }

    pub fn ws_port(&self) -> u16 {
        self.ws_port.unwrap_or(DEFAULT_WS_PORT)
    }

    pub fn http_port(&self) -> u16 {
        self.http_port.unwrap_or(DEFAULT_HTTP_PORT)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("./logs"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn cors_origin(&self) -> &str {
        self.cors_origin.as_deref().unwrap_or(DEFAULT_CORS_ORIGIN)
    }

    /// Period between pushes. A zero value is raised to one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS).max(1))
    }

    /// Upstream settings for `RedditClient`. Fails when the credential pair is incomplete.
    pub fn reddit_config(&self) -> Result<RedditConfig> {
        let client_id = self.client_id.as_deref().map(str::trim).unwrap_or_default();
        let client_secret = self.client_secret.as_deref().map(str::trim).unwrap_or_default();
        if client_id.is_empty() || client_secret.is_empty() {
            bail!("REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET must both be set");
        }

        let mut reddit = RedditConfig::new(client_id, client_secret);
        if let Some(url) = &self.oauth_url {
            reddit.oauth_url = url.clone();
        }
        if let Some(url) = &self.api_url {
            reddit.api_base_url = url.clone();
        }
        if let Some(agent) = &self.user_agent {
            reddit.user_agent = agent.clone();
        }
        Ok(reddit)
    }
}

/// A resolved configuration plus notes about the config file, to be logged
/// once logging is set up.
pub struct Loaded {
    pub config: Config,
    pub notes: Vec<(log::Level, String)>,
}

pub fn load_config() -> Loaded {
    resolve(Config::parse())
}

/// Layers defaults, then the JSON config file, then the already parsed
/// environment/CLI values.
pub fn resolve(cli: Config) -> Loaded {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();
    let mut notes = Vec::new();

    if config_file_path.exists() {
        match fs::read_to_string(&config_file_path) {
            Ok(config_str) => match serde_json::from_str::<Config>(&config_str) {
                Ok(file_config) => current_config = current_config.merge(file_config),
                Err(e) => notes.push((
                    log::Level::Warn,
                    format!("Failed to parse config file {}: {}. Ignoring it.", config_file_path.display(), e),
                )),
            },
            Err(e) => notes.push((
                log::Level::Warn,
                format!("Failed to read config file {}: {}. Ignoring it.", config_file_path.display(), e),
            )),
        }
    } else {
        notes.push((
            log::Level::Info,
            format!("Config file not found at {}. Using defaults and environment/CLI variables.", config_file_path.display()),
        ));
    }

    Loaded {
        config: current_config.merge(cli),
        notes,
    }
}
