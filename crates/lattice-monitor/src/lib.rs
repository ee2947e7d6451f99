//! Diagnostic monitor socket for a lattice scheduling node.
//!
//! A node keeps its job state in a coordination-service tree and consumes it
//! through two views: direct reads against the backend and a watch-driven
//! cached mirror. The monitor lets an operator connect over plain TCP, send
//! the single `dump` command, and receive a per-node consistency report of
//! the job subtree — any divergence between the two views indicates cache
//! staleness or a race between writers and watchers.
//!
//! The service is deliberately small: one background accept thread,
//! connections handled one at a time, no state kept between requests.
//! Sensitive addresses are masked before a response leaves the process.

mod dump;
mod redact;
mod service;
pub mod telemetry;
mod transport;

pub use dump::{DumpEntry, dump_tree};
pub use redact::{IpRedactor, LineRedactor};
pub use service::MonitorService;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionError, MonitorError};
