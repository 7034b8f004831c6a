use crate::workflows::allocation::{OverflowAction, DEFAULT_SEED};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Qualification columns of the reference facility sheet, in column order.
pub const DEFAULT_QUALIFICATIONS: [&str; 5] = ["MBChB", "BDS", "B.PHARM", "BSN", "BSM"];
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 20;

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
    pub allocation: AllocationConfig,
    pub import: ImportConfig,
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

        let seed = match env::var("APP_ALLOCATION_SEED") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed { value })?,
            Err(_) => DEFAULT_SEED,
        };
        let overflow_action = match env::var("APP_OVERFLOW_ACTION") {
            Ok(value) => value
                .parse::<OverflowAction>()
                .map_err(|_| ConfigError::InvalidOverflowAction { value })?,
            Err(_) => OverflowAction::default(),
        };

        let header_scan_rows = match env::var("APP_HEADER_SCAN_ROWS") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|rows| *rows > 0)
                .ok_or(ConfigError::InvalidHeaderScan { value })?,
            Err(_) => DEFAULT_HEADER_SCAN_ROWS,
        };
        let qualifications = match env::var("APP_QUALIFICATIONS") {
            Ok(value) => parse_qualifications(&value)?,
            Err(_) => default_qualifications(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            allocation: AllocationConfig {
                seed,
                overflow_action,
            },
            import: ImportConfig {
                header_scan_rows,
                qualifications,
            },
        })
    }
}

fn default_qualifications() -> Vec<String> {
    DEFAULT_QUALIFICATIONS.iter().map(|q| q.to_string()).collect()
}

fn parse_qualifications(value: &str) -> Result<Vec<String>, ConfigError> {
    let qualifications: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();
    if qualifications.is_empty() {
        return Err(ConfigError::EmptyQualifications);
    }
    Ok(qualifications)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied when a request or command leaves them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationConfig {
    pub seed: u64,
    pub overflow_action: OverflowAction,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            overflow_action: OverflowAction::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub header_scan_rows: usize,
    pub qualifications: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            qualifications: default_qualifications(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSeed { value: String },
    InvalidOverflowAction { value: String },
    InvalidHeaderScan { value: String },
    EmptyQualifications,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSeed { value } => {
                write!(f, "APP_ALLOCATION_SEED must be a u64, got '{}'", value)
            }
            ConfigError::InvalidOverflowAction { value } => write!(
                f,
                "APP_OVERFLOW_ACTION must be 'spread' or 'leave_unassigned', got '{}'",
                value
            ),
            ConfigError::InvalidHeaderScan { value } => write!(
                f,
                "APP_HEADER_SCAN_ROWS must be a positive integer, got '{}'",
                value
            ),
            ConfigError::EmptyQualifications => {
                write!(f, "APP_QUALIFICATIONS must name at least one qualification")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

/// Serialises tests that touch process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
