use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thryve::DecodeConfig;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Intake cap on the request body in MB; unset reads bodies of any size
    #[serde(default)]
    pub max_body_size_mb: Option<usize>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Route the webhook sender posts deliveries to
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Decode pipeline settings
    #[serde(default)]
    pub decode: DecodeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: None,
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            webhook_path: default_webhook_path(),
            decode: DecodeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    ///
    /// `server.{toml,yaml,json}` in the working directory is read if present,
    /// then `THRYVE_WEBHOOK__*` variables override it (nested keys use `__`,
    /// e.g. `THRYVE_WEBHOOK__DECODE__MAX_DECOMPRESSED_BYTES`).
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("THRYVE_WEBHOOK")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.webhook_path.starts_with('/'),
            "webhook_path must start with '/', got {:?}",
            self.webhook_path
        );
        if let Some(mb) = self.max_body_size_mb {
            anyhow::ensure!(mb > 0, "max_body_size_mb must be greater than zero");
            anyhow::ensure!(
                mb.checked_mul(BYTES_PER_MB).is_some(),
                "max_body_size_mb {mb} does not fit in usize bytes"
            );
        }
        self.decode.validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Intake cap in bytes, `None` when bodies are unbounded
    pub fn max_body_size(&self) -> Option<usize> {
        self.max_body_size_mb.and_then(|mb| mb.checked_mul(BYTES_PER_MB))
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_webhook_path() -> String {
    "/webhooks/thryve".to_string()
}
