//! Listener lifecycle for the monitor socket.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::TRANSPORT_TARGET;
use super::errors::MonitorError;
use super::handler::ConnectionHandler;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Listener bound to the configured monitor endpoint.
#[derive(Debug)]
pub(crate) struct MonitorListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl MonitorListener {
    /// Binds the endpoint, resolving `host:port` first.
    pub(crate) fn bind(host: &str, port: u16) -> Result<Self, MonitorError> {
        let listener = bind_tcp(host, port)?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| MonitorError::LocalAddr { source })?;
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address actually bound; differs from the request for port `0`.
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts the accept loop on a background thread.
    ///
    /// Accepts are non-blocking with a short backoff so the loop can observe
    /// the shutdown flag between polls instead of parking in `accept`.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, MonitorError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| MonitorError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let local_addr = self.local_addr;
        let listener = self.listener;
        let handle = thread::spawn(move || run_accept_loop(&listener, &flag, handler.as_ref()));
        Ok(ListenerHandle {
            shutdown,
            local_addr,
            handle: Some(handle),
        })
    }
}

/// Handle to the background accept thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    local_addr: SocketAddr,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Address the listener is serving on.
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Requests shutdown; the accept thread exits at its next poll.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept thread to exit and release the socket.
    pub(crate) fn join(mut self) -> Result<(), MonitorError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| MonitorError::ThreadPanic),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(listener: &TcpListener, shutdown: &AtomicBool, handler: &dyn ConnectionHandler) {
    info!(
        target: TRANSPORT_TARGET,
        addr = %local_addr_for_log(listener),
        "monitor listener active"
    );
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!(target: TRANSPORT_TARGET, error = %e, "failed to prepare connection");
                    continue;
                }
                // Handled inline: the protocol serialises requests on the
                // accept thread, one connection fully closed before the next.
                if let Err(e) = handler.handle(stream) {
                    warn!(
                        target: TRANSPORT_TARGET,
                        error = %e,
                        peer = %peer,
                        "monitor connection failed"
                    );
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(e) => {
                error!(
                    target: TRANSPORT_TARGET,
                    error = %e,
                    "monitor accept failed; listener stopping"
                );
                break;
            }
        }
    }
    debug!(target: TRANSPORT_TARGET, "monitor listener stopped");
}

fn local_addr_for_log(listener: &TcpListener) -> String {
    listener
        .local_addr()
        .map_or_else(|_| "<unknown>".to_owned(), |addr| addr.to_string())
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, MonitorError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| MonitorError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| MonitorError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| MonitorError::Bind { addr, source })
}
