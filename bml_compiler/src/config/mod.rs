//! Configuration for the pattern compiler
//!
//! Security limits are compile-time constants in [`constants`]; user-facing
//! preferences live in [`runtime`] and come from `BML_*` environment variables
//! or a TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{ConfigError, RuntimeConfig};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("BML_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns a one-line description of the build
    pub fn source_info() -> String {
        format!(
            "{} {} ({} profile)",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            profile()
        )
    }
}
