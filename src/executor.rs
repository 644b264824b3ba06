use std::{future::Future, time::Duration};

use pyng::Java;

use crate::{
    structures::{PlayerSample, Players, ServerStatus, Version},
    Failure,
};

/// Per-step timeout handed to `pyng`.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);
/// Deadline for the whole status exchange, SRV lookup included.
pub const STATUS_DEADLINE: Duration = Duration::from_secs(5);

/// Something that can fetch the status of a server.
pub trait StatusQuery {
    fn query(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<ServerStatus, Failure>> + Send;
}

/// Queries Java edition servers with the Server List Ping protocol.
#[derive(Debug, Clone, Copy)]
pub struct JavaStatusQuery {
    pub timeout: Duration,
    pub deadline: Duration,
}

impl Default for JavaStatusQuery {
    fn default() -> Self {
        Self {
            timeout: STATUS_TIMEOUT,
            deadline: STATUS_DEADLINE,
        }
    }
}

impl StatusQuery for JavaStatusQuery {
    async fn query(&self, host: &str, port: u16) -> Result<ServerStatus, Failure> {
        ping_java(server_address(host, port), self.timeout, self.deadline).await
    }
}

/// Join a host and port, bracketing IPv6 literals.
#[must_use]
pub fn server_address(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

pub async fn ping_java(
    address: String,
    timeout: Duration,
    deadline: Duration,
) -> Result<ServerStatus, Failure> {
    debug!(%address, "pinging java server");
    let ping_future = pyng::tokio::get_status(Java {
        server_address: address,
        timeout: Some(timeout),
    });
    let sleep_future = tokio::time::sleep(deadline);
    #[allow(clippy::redundant_pub_crate)]
    let (latency, response) = tokio::select! {
        val = ping_future => val?,
        () = sleep_future => return Err(Failure::TimedOut),
    };
    if response.players.online > response.players.max {
        warn!(
            online = response.players.online,
            max = response.players.max,
            "server reports more players online than its maximum"
        );
    }
    let mut player_sample: Vec<PlayerSample> = Vec::new();
    if let Some(sample) = response.players.sample {
        for player in sample {
            player_sample.push(PlayerSample {
                uuid: player.id,
                name: player.name,
            });
        }
    }
    Ok(ServerStatus {
        latency: latency.as_secs_f64() * 1000.0,
        players: Players {
            online: response.players.online,
            maximum: response.players.max,
            sample: player_sample,
        },
        motd: response.description.text(),
        version: Version {
            protocol: response.version.protocol,
            broadcast: response.version.name,
        },
    })
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::testing::{spawn_mock, Behavior, STATUS_JSON};

    #[test]
    fn addresses() {
        assert_eq!(server_address("localhost", 8888), "localhost:8888");
        assert_eq!(server_address("127.0.0.1", 1), "127.0.0.1:1");
        assert_eq!(server_address("::1", 25565), "[::1]:25565");
        assert_eq!(server_address("[::1]", 25565), "[::1]:25565");
    }

    #[tokio::test]
    async fn query_mock_server() {
        let addr = spawn_mock(Behavior::Status(STATUS_JSON.to_owned())).await;
        let status = JavaStatusQuery::default()
            .query("127.0.0.1", addr.port())
            .await
            .unwrap();
        assert_eq!(status.version.broadcast, "1.20.1");
        assert_eq!(status.players.online, 3);
        assert_eq!(status.players.maximum, 20);
        assert!(status.players.online <= status.players.maximum);
        assert_eq!(status.motd, "Test");
        assert_eq!(status.players.sample.len(), 3);
        assert_eq!(status.players.sample[0].name, "alice");
        assert!(status.latency >= 0.0);
    }

    #[tokio::test]
    async fn closed_on_handshake_is_a_failure() {
        let addr = spawn_mock(Behavior::CloseImmediately).await;
        let result = JavaStatusQuery::default()
            .query("127.0.0.1", addr.port())
            .await;
        assert!(matches!(result, Err(Failure::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn non_minecraft_service_is_a_failure() {
        let addr = spawn_mock(Behavior::Garbage).await;
        let result = JavaStatusQuery::default()
            .query("127.0.0.1", addr.port())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn deadline_beats_slow_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        let query = JavaStatusQuery {
            timeout: Duration::from_secs(5),
            deadline: Duration::from_millis(200),
        };
        let result = query.query("127.0.0.1", addr.port()).await;
        assert!(matches!(result, Err(Failure::TimedOut)));
    }
}
