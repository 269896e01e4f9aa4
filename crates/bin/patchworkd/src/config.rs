//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `patchwork.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use patchwork_adapter_root_shell::RootShellConfig;
use patchwork_domain::automation::Trigger;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Root shell backend settings.
    pub root: RootConfig,
    /// Which automation modules to host.
    pub modules: ModulesConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `127.0.0.1`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Root shell backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Elevation binary.
    pub su_path: String,
    /// Shell used to look the elevation binary up.
    pub shell_path: String,
    /// Budget for each availability or permission probe.
    pub probe_timeout_ms: u64,
}

/// Hosted automation modules.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Triggers to host a module for, by name (e.g. `screen_off`).
    pub enabled: Vec<String>,
}

impl Config {
    /// Load configuration from `patchwork.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("patchwork.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PATCHWORK_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PATCHWORK_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("PATCHWORK_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PATCHWORK_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("PATCHWORK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.root.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "root.probe_timeout_ms must be non-zero".to_string(),
            ));
        }
        self.module_triggers()?;
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Settings for the root shell backend.
    #[must_use]
    pub fn root_shell(&self) -> RootShellConfig {
        RootShellConfig {
            su_path: self.root.su_path.clone(),
            shell_path: self.root.shell_path.clone(),
            probe_timeout: Duration::from_millis(self.root.probe_timeout_ms),
        }
    }

    /// Triggers of the modules to host, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a name is not a known trigger.
    pub fn module_triggers(&self) -> Result<Vec<Trigger>, ConfigError> {
        let mut triggers = Vec::with_capacity(self.modules.enabled.len());
        for name in &self.modules.enabled {
            let trigger: Trigger = name
                .parse()
                .map_err(|err| ConfigError::Validation(format!("modules.enabled: {err}")))?;
            if !triggers.contains(&trigger) {
                triggers.push(trigger);
            }
        }
        Ok(triggers)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:patchwork.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "patchworkd=info,patchwork=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        let defaults = RootShellConfig::default();
        Self {
            su_path: defaults.su_path,
            shell_path: defaults.shell_path,
            probe_timeout_ms: u64::try_from(defaults.probe_timeout.as_millis()).unwrap_or(2_000),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            enabled: Trigger::ALL.iter().map(|t| t.as_str().to_string()).collect(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
