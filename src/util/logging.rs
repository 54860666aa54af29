//! Structured logging for cellbase.
//!
//! Events go through `tracing` with target "cellbase" and carry an `event`
//! field naming what happened. The library never installs a subscriber.

/// Target for all cellbase log events.
pub(crate) const LOG_TARGET: &str = "cellbase";

macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::util::logging::LOG_TARGET, $($field)*)
    };
}

macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::util::logging::LOG_TARGET, $($field)*)
    };
}

macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::util::logging::LOG_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
