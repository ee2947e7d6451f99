//! Monitor service facade owning the listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use lattice_config::{Config, MonitorEndpoint, MonitorPortError};
use lattice_registry::{CachedMirror, RegistryReader, path};

use crate::redact::{IpRedactor, LineRedactor};
use crate::transport::{
    ConnectionHandler, DumpConnectionHandler, ListenerHandle, MonitorError, MonitorListener,
};

const SERVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::service");

/// Diagnostic monitor attached to a scheduling node.
///
/// Created once at node startup and closed on node shutdown. With a disabled
/// endpoint both lifecycle calls are deliberate no-ops, so the hosting node
/// can drive the monitor unconditionally.
pub struct MonitorService {
    endpoint: MonitorEndpoint,
    job_root: String,
    registry: Arc<dyn RegistryReader>,
    mirror: Arc<dyn CachedMirror>,
    redactor: Arc<dyn LineRedactor>,
    listener: Option<ListenerHandle>,
}

impl MonitorService {
    /// Builds a monitor for the named job over the registry seams.
    #[must_use]
    pub fn new(
        endpoint: MonitorEndpoint,
        job_name: &str,
        registry: Arc<dyn RegistryReader>,
        mirror: Arc<dyn CachedMirror>,
    ) -> Self {
        Self {
            endpoint,
            job_root: path::job_root(job_name),
            registry,
            mirror,
            redactor: Arc::new(IpRedactor::new()),
            listener: None,
        }
    }

    /// Builds a monitor from the node configuration.
    pub fn from_config(
        config: &Config,
        registry: Arc<dyn RegistryReader>,
        mirror: Arc<dyn CachedMirror>,
    ) -> Result<Self, MonitorPortError> {
        let endpoint = config.monitor_endpoint()?;
        Ok(Self::new(endpoint, config.job_name(), registry, mirror))
    }

    /// Replaces the default redactor.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Arc<dyn LineRedactor>) -> Self {
        self.redactor = redactor;
        self
    }

    /// Starts the accept loop.
    ///
    /// Idempotent: a disabled endpoint or an already-listening service is a
    /// no-op. A bind failure is fatal and leaves the service not listening.
    pub fn listen(&mut self) -> Result<(), MonitorError> {
        if self.listener.is_some() {
            return Ok(());
        }
        let MonitorEndpoint::Tcp { host, port } = &self.endpoint else {
            debug!(target: SERVICE_TARGET, "monitor disabled; not listening");
            return Ok(());
        };
        let listener = MonitorListener::bind(host, *port)?;
        info!(
            target: SERVICE_TARGET,
            addr = %listener.local_addr(),
            job_root = %self.job_root,
            "monitor service listening"
        );
        let handler: Arc<dyn ConnectionHandler> = Arc::new(DumpConnectionHandler::new(
            self.job_root.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.mirror),
            Arc::clone(&self.redactor),
        ));
        self.listener = Some(listener.start(handler)?);
        Ok(())
    }

    /// Address the monitor is serving on, when listening.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(ListenerHandle::local_addr)
    }

    /// Stops accepting and releases the socket.
    ///
    /// Idempotent: safe when the monitor is disabled, never started, or
    /// already closed. Blocks until the accept thread has exited.
    pub fn close(&mut self) {
        let Some(handle) = self.listener.take() else {
            return;
        };
        handle.shutdown();
        if handle.join().is_err() {
            warn!(target: SERVICE_TARGET, "monitor accept thread panicked during close");
        } else {
            info!(target: SERVICE_TARGET, "monitor service closed");
        }
    }
}

impl Drop for MonitorService {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpStream;
    use std::sync::Arc;

    use lattice_config::MonitorEndpoint;
    use lattice_registry::{InMemoryMirror, InMemoryRegistry};

    use super::MonitorService;

    fn service(endpoint: MonitorEndpoint) -> MonitorService {
        MonitorService::new(
            endpoint,
            "sampleJob",
            Arc::new(InMemoryRegistry::new()),
            Arc::new(InMemoryMirror::new()),
        )
    }

    #[test]
    fn disabled_endpoint_never_binds() {
        let mut monitor = service(MonitorEndpoint::Disabled);
        monitor.listen().expect("listen is a no-op");
        assert_eq!(monitor.local_addr(), None);
        monitor.close();
    }

    #[test]
    fn listen_is_idempotent() {
        let mut monitor = service(MonitorEndpoint::tcp("127.0.0.1", 0));
        monitor.listen().expect("first listen");
        let addr = monitor.local_addr().expect("bound address");
        monitor.listen().expect("second listen is a no-op");
        assert_eq!(monitor.local_addr(), Some(addr));
        monitor.close();
    }

    #[test]
    fn close_is_idempotent_and_releases_the_port() {
        let mut monitor = service(MonitorEndpoint::tcp("127.0.0.1", 0));
        monitor.listen().expect("listen");
        let addr = monitor.local_addr().expect("bound address");

        monitor.close();
        monitor.close();

        assert_eq!(monitor.local_addr(), None);
        assert!(
            TcpStream::connect(addr).is_err(),
            "closed monitor should refuse connections"
        );
    }
}
