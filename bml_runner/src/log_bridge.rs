//! Routes compiler/runtime log events into the `log` facade

use bml_compiler::config::runtime::{LogLevel as PreferenceLevel, LoggingPreferences};
use bml_compiler::logging::{self, LogEvent, LogLevel, Logger, LoggingService};
use std::sync::Arc;

const TARGET: &str = "bml";

/// [`Logger`] forwarding every event to `log`
pub struct LogBridge {
    structured: bool,
}

impl LogBridge {
    pub fn new(structured: bool) -> Self {
        Self { structured }
    }
}

impl Logger for LogBridge {
    fn log(&self, event: &LogEvent) {
        let line = if self.structured {
            event.format_json().unwrap_or_else(|_| event.format())
        } else {
            event.format()
        };
        log::log!(target: TARGET, level_of(event.level), "{}", line);
    }
}

fn level_of(level: LogLevel) -> log::Level {
    match level {
        LogLevel::Error => log::Level::Error,
        LogLevel::Warning => log::Level::Warn,
        LogLevel::Info => log::Level::Info,
        LogLevel::Debug => log::Level::Debug,
    }
}

fn default_filter(level: PreferenceLevel) -> &'static str {
    match level {
        PreferenceLevel::Error => "error",
        PreferenceLevel::Warning => "warn",
        PreferenceLevel::Info => "info",
        PreferenceLevel::Debug => "debug",
    }
}

/// Install env_logger and the bridged global logging service
///
/// `RUST_LOG` overrides the configured minimum level for output; the
/// service still filters events below `min_log_level` before they are built.
pub fn init(preferences: &LoggingPreferences) -> Result<(), String> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(preferences.min_log_level)),
    )
    .format_timestamp(None)
    .try_init()
    .map_err(|e| format!("Failed to install env_logger: {}", e))?;

    logging::config::init_runtime_preferences(preferences.clone())?;
    logging::config::validate_config()?;
    let bridge = Arc::new(LogBridge::new(preferences.use_structured_logging));
    let service = LoggingService::new(bridge, preferences.min_log_level.to_events_log_level());
    logging::init_global_logging_with_service(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_map_onto_log_facade() {
        assert_eq!(level_of(LogLevel::Error), log::Level::Error);
        assert_eq!(level_of(LogLevel::Warning), log::Level::Warn);
        assert_eq!(level_of(LogLevel::Debug), log::Level::Debug);
        assert_eq!(default_filter(PreferenceLevel::Warning), "warn");
    }
}
