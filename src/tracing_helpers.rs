//! Feature-gated logging macros.
//!
//! With the `tracing` feature enabled these forward to the `tracing` crate.
//! Without it they expand to nothing, so the hot paths of `set` and `draw`
//! carry no logging cost in default builds.
//!
//! ```bash
//! # Default build, logging compiled out
//! cargo build --release
//!
//! # Watch slot reuse and promotions while running the tests
//! RUST_LOG=sortition=debug cargo test --features tracing
//!
//! # Every upsert, including the ancestor deltas
//! RUST_LOG=sortition::tree=trace cargo test --features tracing exhaustive
//! ```

#![allow(unused_macros, unused_imports)]

/// Per-operation detail (`set` calls, ancestor deltas).
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Structural changes: promotions, slot reuse, tree creation.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Rolled-back transactions.
#[cfg(feature = "tracing")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {};
}

/// Broken structural invariants.
#[cfg(feature = "tracing")]
macro_rules! error_log {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! error_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use error_log;
pub(crate) use trace_log;
pub(crate) use warn_log;
