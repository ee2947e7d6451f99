//! Built-in defaults applied when no configuration layer sets a value.

use crate::logging::LogFormat;

/// Job name used when the node is started without one.
pub const DEFAULT_JOB_NAME: &str = "lattice";

/// Interface the monitor socket binds to.
pub const DEFAULT_MONITOR_HOST: &str = "127.0.0.1";

/// Monitor port default. Negative, so monitoring is off unless configured.
pub const DEFAULT_MONITOR_PORT: i32 = -1;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default logging format for the node binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}
