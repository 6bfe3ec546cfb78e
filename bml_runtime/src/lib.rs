//! # BulletML Runtime
//!
//! Binds host entities to compiled patterns and advances them tick by tick.
//!
//! ```text
//! Pattern (bml_compiler) ──► Emitter ──► Bullet ──► TaskTree ──► Entity
//!                                          ▲                       │
//!                                          └──── BulletManager ◄───┘
//! ```
//!
//! The host implements [`Entity`] and [`BulletManager`]; the runtime never
//! allocates entities itself. Enable the `logging` feature to trace task
//! execution through the `log` crate.

/// Interpreter tracing, compiled out unless the `logging` feature is on
#[cfg(feature = "logging")]
macro_rules! trace_task {
    ($($arg:tt)*) => {
        log::trace!(target: "bml_runtime::task", $($arg)*)
    };
}

#[cfg(not(feature = "logging"))]
macro_rules! trace_task {
    ($($arg:tt)*) => {
        if false {
            let _ = format_args!($($arg)*);
        }
    };
}

pub mod bullet;
pub mod emitter;
pub mod error;
pub mod host;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use bullet::Bullet;
pub use emitter::Emitter;
pub use error::{RuntimeError, RuntimeResult};
pub use host::{BulletManager, Emission, EmitterId, Entity, Vec2};
pub use task::{RunStatus, TaskId, TaskTree};
