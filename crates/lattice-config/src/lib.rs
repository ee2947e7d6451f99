//! Shared configuration for a lattice scheduling node and its monitor socket.
//!
//! Configuration is layered: CLI flags override environment variables
//! (`LATTICE_*`), which override the optional configuration file, which
//! overrides the built-in defaults. The hosting node loads one [`Config`] at
//! startup and hands the relevant slices to its components; the monitor
//! service consumes the job name and the resolved [`MonitorEndpoint`].

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod monitor;

pub use defaults::{
    DEFAULT_JOB_NAME, DEFAULT_LOG_FILTER, DEFAULT_MONITOR_HOST, DEFAULT_MONITOR_PORT,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use monitor::{MonitorEndpoint, MonitorPortError};

/// Node configuration resolved from CLI, environment, file and defaults.
///
/// Fields are optional so that each layer only contributes the values it
/// actually sets; accessors apply the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LATTICE")]
pub struct Config {
    /// Name of the job this node schedules; roots the registry subtree.
    pub job_name: Option<String>,
    /// Interface the monitor socket binds to.
    pub monitor_host: Option<String>,
    /// Monitor TCP port; negative disables the monitor service.
    pub monitor_port: Option<i32>,
    /// Log filter expression understood by the tracing subscriber.
    pub log_filter: Option<String>,
    /// Log output format.
    pub log_format: Option<LogFormat>,
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument iterator.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args).map_err(Into::into)
    }

    /// Job name, falling back to the built-in default.
    #[must_use]
    pub fn job_name(&self) -> &str {
        self.job_name.as_deref().unwrap_or(DEFAULT_JOB_NAME)
    }

    /// Host the monitor socket binds to.
    #[must_use]
    pub fn monitor_host(&self) -> &str {
        self.monitor_host.as_deref().unwrap_or(DEFAULT_MONITOR_HOST)
    }

    /// Configured monitor port; negative means disabled.
    #[must_use]
    pub fn monitor_port(&self) -> i32 {
        self.monitor_port.unwrap_or(DEFAULT_MONITOR_PORT)
    }

    /// Resolves the monitor endpoint from host and signed port.
    pub fn monitor_endpoint(&self) -> Result<MonitorEndpoint, MonitorPortError> {
        MonitorEndpoint::from_signed_port(self.monitor_host(), self.monitor_port())
    }

    /// Log filter expression, falling back to the built-in default.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log output format, falling back to the built-in default.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_default()
    }
}
