use std::time::Duration;

use tokio::net::TcpStream;

/// Check that `host:port` accepts a TCP connection within `timeout`.
///
/// Name resolution counts against the timeout. Every failure, including a
/// failed lookup, is reported as `false`. The connection is closed before
/// returning.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            trace!(peer = ?stream.peer_addr().ok(), "port accepted connection");
            true
        }
        Ok(Err(error)) => {
            debug!(%host, port, %error, "could not connect");
            false
        }
        Err(_) => {
            debug!(%host, port, ?timeout, "connect timed out");
            false
        }
    }
}
