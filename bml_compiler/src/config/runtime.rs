// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a .xml / .bulletml extension
    pub require_pattern_extension: bool,

    /// Whether to log size and line metrics for every loaded file
    pub log_file_metrics: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_pattern_extension: env::var(env_vars::REQUIRE_PATTERN_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_file_metrics: env::var(env_vars::LOG_FILE_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderPreferences {
    /// Whether to warn about attributes the pattern language does not define
    pub warn_unknown_attributes: bool,

    /// Whether to log each resolved reference during validation
    pub log_validation_details: bool,
}

impl Default for LoaderPreferences {
    fn default() -> Self {
        Self {
            warn_unknown_attributes: env::var(env_vars::LOADER_WARN_UNKNOWN_ATTRIBUTES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_validation_details: env::var(env_vars::LOADER_LOG_VALIDATION_DETAILS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Defaults for simulated runs driven by the command-line runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationPreferences {
    /// Number of ticks to simulate
    pub ticks: u32,

    /// Seed for the random source; entropy-seeded when absent
    pub seed: Option<u64>,

    /// Difficulty scalar exposed to expressions as $rank
    pub rank: f32,

    /// Aim target used for every entity
    pub target: [f32; 2],

    /// Starting position of the emitting entity
    pub origin: [f32; 2],

    /// Hard cap on live entities; creation fails beyond it
    pub max_entities: usize,
}

impl Default for SimulationPreferences {
    fn default() -> Self {
        Self {
            ticks: env::var(env_vars::SIMULATION_TICKS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            seed: env::var(env_vars::SIMULATION_SEED)
                .ok()
                .and_then(|v| v.parse().ok()),
            rank: env::var(env_vars::SIMULATION_RANK)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
            target: [0.0, 200.0],
            origin: [0.0, 0.0],
            max_entities: env::var(env_vars::SIMULATION_MAX_ENTITIES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Configuration file errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    Parse { message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub loader: LoaderPreferences,
    pub logging: LoggingPreferences,
    pub simulation: SimulationPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; absent sections and keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Serialize back to TOML (used by `bml` to print the effective config)
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_PATTERN_EXTENSION: &str = "BML_REQUIRE_PATTERN_EXTENSION";
    pub const LOG_FILE_METRICS: &str = "BML_LOG_FILE_METRICS";

    // Loader
    pub const LOADER_WARN_UNKNOWN_ATTRIBUTES: &str = "BML_LOADER_WARN_UNKNOWN_ATTRIBUTES";
    pub const LOADER_LOG_VALIDATION_DETAILS: &str = "BML_LOADER_LOG_VALIDATION_DETAILS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "BML_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "BML_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "BML_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "BML_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "BML_LOGGING_INCLUDE_FILE_CONTEXT";

    // Simulation
    pub const SIMULATION_TICKS: &str = "BML_SIMULATION_TICKS";
    pub const SIMULATION_SEED: &str = "BML_SIMULATION_SEED";
    pub const SIMULATION_RANK: &str = "BML_SIMULATION_RANK";
    pub const SIMULATION_MAX_ENTITIES: &str = "BML_SIMULATION_MAX_ENTITIES";
}
