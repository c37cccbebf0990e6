//! Logging abstraction layer.
//!
//! The navigator never talks to a logging crate directly. Every message goes
//! through one of the macros below, which forward to the [`log`](https://docs.rs/log)
//! crate or to [`tracing`](https://docs.rs/tracing) depending on the enabled
//! feature. Enable at most one of the two; with neither enabled the macros
//! expand to nothing.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! What gets logged where:
//!
//! - `info_log!` - route registration, navigation start and commit, and the
//!   built-in [`LoggingGuard`](crate::LoggingGuard).
//! - `debug_log!` - guard decisions, redirects, superseded navigations.
//! - `trace_log!` - state-machine phase changes and match-cache activity.
//! - `warn_log!` - not-found paths and unknown route names.
//! - `error_log!` - lazy load failures and redirect loops.
//!
//! ```ignore
//! use view_navigator::{debug_log, info_log};
//!
//! info_log!("Navigation #{} committed: '{}'", seq, path);
//! debug_log!("Guard '{}' redirected to '{}'", guard.name(), to);
//! ```

/// Emit a **trace**-level log message.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Emit a **debug**-level log message.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Emit an **info**-level log message.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Emit a **warn**-level log message.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Emit an **error**-level log message.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}
