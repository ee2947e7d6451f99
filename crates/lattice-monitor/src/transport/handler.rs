//! Connection handling for the monitor socket.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use tracing::debug;

use lattice_registry::{CachedMirror, RegistryReader};

use super::TRANSPORT_TARGET;
use super::command::MonitorCommand;
use super::errors::ConnectionError;
use crate::dump::dump_tree;
use crate::redact::LineRedactor;

/// Maximum accepted command-line length; anything longer is not a command.
const MAX_COMMAND_BYTES: usize = 1024;

/// Handles one accepted monitor connection.
///
/// The stream, and with it the connection, is released when the call
/// returns, on success and failure alike.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection to completion.
    fn handle(&self, stream: TcpStream) -> Result<(), ConnectionError>;
}

/// Handler serving the `dump` command against the registry seams.
pub(crate) struct DumpConnectionHandler {
    job_root: String,
    registry: Arc<dyn RegistryReader>,
    mirror: Arc<dyn CachedMirror>,
    redactor: Arc<dyn LineRedactor>,
}

impl DumpConnectionHandler {
    pub(crate) fn new(
        job_root: String,
        registry: Arc<dyn RegistryReader>,
        mirror: Arc<dyn CachedMirror>,
        redactor: Arc<dyn LineRedactor>,
    ) -> Self {
        Self {
            job_root,
            registry,
            mirror,
            redactor,
        }
    }

    fn respond(&self, stream: &mut TcpStream) -> Result<(), ConnectionError> {
        let entries = dump_tree(
            self.registry.as_ref(),
            self.mirror.as_ref(),
            &self.job_root,
        )
        .map_err(|source| ConnectionError::Dump {
            root: self.job_root.clone(),
            source,
        })?;
        let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
        let mut body = self.redactor.redact(lines).join("\n");
        body.push('\n');
        stream
            .write_all(body.as_bytes())
            .and_then(|()| stream.flush())
            .map_err(|source| ConnectionError::Write { source })
    }
}

impl ConnectionHandler for DumpConnectionHandler {
    fn handle(&self, mut stream: TcpStream) -> Result<(), ConnectionError> {
        let Some(line) = read_command_line(&mut stream)? else {
            return Ok(());
        };
        match MonitorCommand::parse(&line) {
            Some(MonitorCommand::Dump) => self.respond(&mut stream),
            // Unrecognised input is not an error: the connection simply
            // closes with no response bytes.
            None => {
                debug!(target: TRANSPORT_TARGET, "unrecognised monitor command");
                Ok(())
            }
        }
    }
}

/// Reads one line, terminated by newline or connection close.
///
/// Returns `None` when the client closed without sending any bytes. The
/// terminator is not part of the returned line.
fn read_command_line(stream: &mut TcpStream) -> Result<Option<String>, ConnectionError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 256];
    loop {
        let read = match stream.read(&mut chunk) {
            Ok(read) => read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(ConnectionError::Read { source }),
        };
        if read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            return Ok(Some(decode(&buffer)));
        }
        if let Some(position) = chunk[..read].iter().position(|byte| *byte == b'\n') {
            buffer.extend_from_slice(&chunk[..position]);
            return Ok(Some(decode(&buffer)));
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.len() > MAX_COMMAND_BYTES {
            return Err(ConnectionError::Oversized {
                limit: MAX_COMMAND_BYTES,
            });
        }
    }
}

fn decode(buffer: &[u8]) -> String {
    String::from_utf8_lossy(buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::sync::Arc;
    use std::thread;

    use lattice_registry::{CachedEntry, InMemoryMirror, InMemoryRegistry};

    use super::*;
    use crate::redact::IpRedactor;

    fn sample_handler() -> DumpConnectionHandler {
        let registry = Arc::new(InMemoryRegistry::new());
        let mirror = Arc::new(InMemoryMirror::new());
        registry.put("/sampleJob/a", "1");
        registry.put("/sampleJob/b", "2");
        mirror.record("/sampleJob/a", CachedEntry::new("/sampleJob/a", "1"));
        mirror.record("/sampleJob/b", CachedEntry::new("/sampleJob/b", "9"));
        DumpConnectionHandler::new(
            "/sampleJob".to_owned(),
            registry,
            mirror,
            Arc::new(IpRedactor::new()),
        )
    }

    fn exchange(handler: DumpConnectionHandler, request: &[u8]) -> Vec<u8> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            handler.handle(stream)
        });

        let mut client = TcpStream::connect(addr).expect("connect client");
        client.write_all(request).expect("write request");
        client
            .shutdown(Shutdown::Write)
            .expect("close client write half");
        let mut response = Vec::new();
        client.read_to_end(&mut response).expect("read response");

        let outcome = server.join().expect("join server");
        assert!(outcome.is_ok(), "handler failed: {outcome:?}");
        response
    }

    #[test]
    fn dump_returns_the_joined_report_with_trailing_newline() {
        let response = exchange(sample_handler(), b"dump\n");
        assert_eq!(
            response,
            b"/sampleJob/a | 1\n/sampleJob/b | 2 | /sampleJob/b | 9\n"
        );
    }

    #[test]
    fn unrecognised_command_closes_with_zero_bytes() {
        let response = exchange(sample_handler(), b"status\n");
        assert!(response.is_empty());
    }

    #[test]
    fn closing_without_a_line_produces_no_response() {
        let response = exchange(sample_handler(), b"");
        assert!(response.is_empty());
    }

    #[test]
    fn responses_are_redacted_before_transmission() {
        let registry = Arc::new(InMemoryRegistry::new());
        let mirror = Arc::new(InMemoryMirror::new());
        registry.put("/sampleJob/leader", "10.0.0.7:9001");
        mirror.record(
            "/sampleJob/leader",
            CachedEntry::new("/sampleJob/leader", "10.0.0.7:9001"),
        );
        let handler = DumpConnectionHandler::new(
            "/sampleJob".to_owned(),
            registry,
            mirror,
            Arc::new(IpRedactor::new()),
        );

        let response = exchange(handler, b"dump\n");
        let text = String::from_utf8(response).expect("utf8 response");
        assert!(!text.contains("10.0.0.7"), "raw address leaked: {text}");
        assert_eq!(text, "/sampleJob/leader | ip_address_0:9001\n");
    }

    #[test]
    fn oversized_lines_fail_the_connection() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept connection");
            sample_handler().handle(stream)
        });

        let mut client = TcpStream::connect(addr).expect("connect client");
        client.write_all(&[b'x'; 4096]).expect("write request");
        client.flush().expect("flush request");

        let outcome = server.join().expect("join server");
        assert!(matches!(outcome, Err(ConnectionError::Oversized { .. })));
    }
}
