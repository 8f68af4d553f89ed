use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::standings::EvaluationConfig;

const DEFAULT_CUTOFF_YEAR: i32 = 2025;
const DEFAULT_LOOKBACK_YEARS: u32 = 5;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoreboard: ScoreboardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cutoff_year = match env::var("SCOREBOARD_CUTOFF_YEAR") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidCutoffYear(raw))?,
            Err(_) => DEFAULT_CUTOFF_YEAR,
        };

        let lookback_years = match env::var("SCOREBOARD_LOOKBACK_YEARS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|years| *years >= 1)
                .ok_or(ConfigError::InvalidLookback(raw))?,
            Err(_) => DEFAULT_LOOKBACK_YEARS,
        };

        let data_dir = env::var("SCOREBOARD_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoreboard: ScoreboardConfig {
                cutoff_year,
                lookback_years,
                data_dir,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Badge window and data source selection.
#[derive(Debug, Clone)]
pub struct ScoreboardConfig {
    pub cutoff_year: i32,
    pub lookback_years: u32,
    /// Directory holding CSV exports; the built-in demo roster is used when unset.
    pub data_dir: Option<PathBuf>,
}

impl ScoreboardConfig {
    pub fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            cutoff_year: self.cutoff_year,
            lookback_years: self.lookback_years,
            ..EvaluationConfig::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCutoffYear(String),
    InvalidLookback(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCutoffYear(raw) => {
                write!(f, "SCOREBOARD_CUTOFF_YEAR must be a year, got '{}'", raw)
            }
            ConfigError::InvalidLookback(raw) => write!(
                f,
                "SCOREBOARD_LOOKBACK_YEARS must be a positive integer, got '{}'",
                raw
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCutoffYear(_)
            | ConfigError::InvalidLookback(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("SCOREBOARD_CUTOFF_YEAR");
        env::remove_var("SCOREBOARD_LOOKBACK_YEARS");
        env::remove_var("SCOREBOARD_DATA_DIR");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoreboard.cutoff_year, DEFAULT_CUTOFF_YEAR);
        assert_eq!(config.scoreboard.lookback_years, DEFAULT_LOOKBACK_YEARS);
        assert!(config.scoreboard.data_dir.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn scoreboard_window_flows_into_evaluation_config() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCOREBOARD_CUTOFF_YEAR", "2023");
        env::set_var("SCOREBOARD_LOOKBACK_YEARS", "3");
        env::set_var("SCOREBOARD_DATA_DIR", "/srv/scoreboard");
        let config = AppConfig::load().expect("config loads");
        let evaluation = config.scoreboard.evaluation_config();
        assert_eq!(evaluation.cutoff_year, 2023);
        assert_eq!(evaluation.lookback_years, 3);
        assert_eq!(evaluation.gap_tolerance_days, 5);
        assert_eq!(
            config.scoreboard.data_dir,
            Some(PathBuf::from("/srv/scoreboard"))
        );
        reset_env();
    }

    #[test]
    fn rejects_zero_lookback() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCOREBOARD_LOOKBACK_YEARS", "0");
        let err = AppConfig::load().expect_err("zero lookback rejected");
        assert!(matches!(err, ConfigError::InvalidLookback(ref raw) if raw == "0"));
        reset_env();
    }
}
