use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolved endpoint for the diagnostic monitor socket.
///
/// The monitor port is configured as a signed integer so operators can switch
/// the service off with a negative value; this type owns that rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorEndpoint {
    /// Monitoring is switched off by configuration.
    Disabled,
    /// TCP endpoint the monitor binds. Port `0` binds an ephemeral port.
    Tcp { host: String, port: u16 },
}

impl MonitorEndpoint {
    /// Builds a TCP monitor endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Maps the configured signed port to an endpoint.
    ///
    /// Negative ports disable monitoring; ports above the TCP range are a
    /// configuration error rather than a silent no-op.
    pub fn from_signed_port(host: &str, port: i32) -> Result<Self, MonitorPortError> {
        if port < 0 {
            return Ok(Self::Disabled);
        }
        u16::try_from(port)
            .map(|port| Self::tcp(host, port))
            .map_err(|_| MonitorPortError::OutOfRange(port))
    }

    /// Whether the endpoint will bind a socket.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Tcp { .. })
    }
}

impl fmt::Display for MonitorEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => formatter.write_str("disabled"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

/// Errors raised while resolving the configured monitor port.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorPortError {
    /// Positive port value that does not fit the TCP port range.
    #[error("monitor port {0} exceeds the TCP port range")]
    OutOfRange(i32),
}
