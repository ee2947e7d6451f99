//! Error types for the monitor transport.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use lattice_registry::RegistryError;

/// Errors surfaced while binding or running the monitor listener.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Resolving the configured host and port failed.
    #[error("failed to resolve monitor address {host}:{port}: {source}")]
    Resolve {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
    /// The configured host and port resolved to no addresses.
    #[error("no addresses resolved for monitor endpoint {host}:{port}")]
    ResolveEmpty {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
    /// Binding the listening socket failed.
    #[error("failed to bind monitor listener at {addr}: {source}")]
    Bind {
        /// Address the bind targeted.
        addr: SocketAddr,
        /// Underlying bind error.
        #[source]
        source: io::Error,
    },
    /// Querying the bound address failed.
    #[error("failed to query monitor listener address: {source}")]
    LocalAddr {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// Switching the listener to non-blocking accepts failed.
    #[error("failed to enable non-blocking monitor accepts: {source}")]
    NonBlocking {
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked.
    #[error("monitor accept thread panicked")]
    ThreadPanic,
}

/// Failures scoped to a single accepted connection.
///
/// These terminate the connection being handled and are reported to the
/// accept loop, which logs them and keeps serving.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Reading the command line failed.
    #[error("failed to read command line: {source}")]
    Read {
        /// Underlying read error.
        #[source]
        source: io::Error,
    },
    /// The client sent more than a command line's worth of bytes.
    #[error("command line exceeds {limit} bytes")]
    Oversized {
        /// Enforced limit in bytes.
        limit: usize,
    },
    /// The registry walk behind a dump failed.
    #[error("dump of '{root}' failed: {source}")]
    Dump {
        /// Root of the attempted dump.
        root: String,
        /// Registry fault that aborted the walk.
        #[source]
        source: RegistryError,
    },
    /// Writing the response failed.
    #[error("failed to write dump response: {source}")]
    Write {
        /// Underlying write error.
        #[source]
        source: io::Error,
    },
}
