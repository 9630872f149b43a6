//! Server configuration

use serde::{Deserialize, Serialize};
use smtgate_core::Z3Config;
use std::path::PathBuf;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Solver process settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// z3 executable (name on PATH or absolute path)
    #[serde(default = "default_solver_binary")]
    pub binary: PathBuf,

    /// Per-request deadline in milliseconds; also handed to z3 as its soft timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra arguments appended to the z3 command line
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_solver_binary() -> PathBuf {
    PathBuf::from("z3")
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            binary: default_solver_binary(),
            timeout_ms: default_timeout_ms(),
            args: Vec::new(),
        }
    }
}

impl SolverSettings {
    /// Deadline for one solve request
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn z3_config(&self) -> Z3Config {
        Z3Config {
            binary: self.binary.clone(),
            timeout_ms: self.timeout_ms,
            args: self.args.clone(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level, used when RUST_LOG is not set
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Solver settings
    #[serde(default)]
    pub solver: SolverSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            solver: SolverSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `config/server.*`, and `SMTGATE_*`
    /// environment variables, in increasing precedence
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();
        Self::load_from("config/server")
    }

    /// Same as [`ServerConfig::load`] with an explicit config file stem
    /// (the extension picks the format: yaml, toml, json)
    pub fn load_from(file: &str) -> anyhow::Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| anyhow::anyhow!("Failed to build default config: {}", e))?;

        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("SMTGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("solver.args")
                    .try_parsing(true),
            )
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.solver, SolverSettings::default());
    }

    #[test]
    fn test_solver_settings_default() {
        let solver = SolverSettings::default();

        assert_eq!(solver.binary, PathBuf::from("z3"));
        assert_eq!(solver.timeout_ms, 30_000);
        assert!(solver.args.is_empty());
        assert_eq!(solver.deadline(), Duration::from_secs(30));
    }

    #[test]
    fn test_solver_settings_to_z3_config() {
        let solver = SolverSettings {
            binary: PathBuf::from("/usr/local/bin/z3"),
            timeout_ms: 2_000,
            args: vec!["smt.random_seed=1".to_string()],
        };
        let z3 = solver.z3_config();

        assert_eq!(z3.binary, PathBuf::from("/usr/local/bin/z3"));
        assert_eq!(z3.timeout_ms, 2_000);
        assert_eq!(z3.args, vec!["smt.random_seed=1".to_string()]);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }

    #[test]
    fn test_partial_solver_section_uses_defaults() {
        let solver: SolverSettings = serde_json::from_str(r#"{"timeout_ms": 500}"#).unwrap();
        assert_eq!(solver.binary, PathBuf::from("z3"));
        assert_eq!(solver.timeout_ms, 500);
    }

    #[test]
    fn test_server_config_debug_format() {
        let config = ServerConfig::default();
        let debug_str = format!("{:?}", config);

        assert!(debug_str.contains("ServerConfig"));
        assert!(debug_str.contains("127.0.0.1"));
        assert!(debug_str.contains("8000"));
    }
}
