//! Local stand-ins for a Minecraft server and for the status query.

use std::{
    net::SocketAddr,
    sync::atomic::{AtomicUsize, Ordering},
};

use pyng::{
    tokio::{read_frame, write_packet},
    Packet,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};

use crate::{
    executor::StatusQuery,
    structures::{PlayerSample, Players, ServerStatus, Version},
    Failure,
};

pub const STATUS_JSON: &str = r#"{
    "version": {"name": "1.20.1", "protocol": 763},
    "players": {
        "max": 20,
        "online": 3,
        "sample": [
            {"name": "alice", "id": "4566e69f-c907-48ee-8d71-d7ba5aa00d20"},
            {"name": "bob", "id": "9a1b1a3e-3b8f-4d0a-9d3c-0b6b2f5c2d11"},
            {"name": "carol", "id": "0f7d3c52-6f0e-4b7c-8c55-1a7f0c9b8e42"}
        ]
    },
    "description": {"text": "Test"}
}"#;

#[derive(Clone)]
pub enum Behavior {
    /// Answer the status exchange with this JSON.
    Status(String),
    /// Accept and drop the connection before the handshake is answered.
    CloseImmediately,
    /// Reply with something that is not a Minecraft packet.
    Garbage,
}

/// Serve connections on an ephemeral loopback port until the test ends.
///
/// Connections that close without sending anything, like the one made by the
/// port probe, are ignored.
pub async fn spawn_mock(behavior: Behavior) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, behavior.clone()));
        }
    });
    addr
}

async fn serve(mut stream: TcpStream, behavior: Behavior) {
    match behavior {
        Behavior::Status(json) => {
            let _ = answer_status(&mut stream, json).await;
        }
        Behavior::CloseImmediately => drop(stream),
        Behavior::Garbage => {
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n")
                .await;
            let _ = stream.shutdown().await;
        }
    }
}

async fn answer_status(stream: &mut TcpStream, json: String) -> Result<(), pyng::Error> {
    let (id, body) = read_frame(stream).await?;
    if !matches!(
        Packet::decode_serverbound(id, &body, false)?,
        Packet::Handshake { .. }
    ) {
        return Err(pyng::Error::InvalidPacket);
    }
    let (id, body) = read_frame(stream).await?;
    if Packet::decode_serverbound(id, &body, true)? != (Packet::Request {}) {
        return Err(pyng::Error::InvalidPacket);
    }
    write_packet(stream, &Packet::Response { response: json }).await?;
    let (id, body) = read_frame(stream).await?;
    let Packet::Ping { payload } = Packet::decode_serverbound(id, &body, true)? else {
        return Err(pyng::Error::InvalidPacket);
    };
    write_packet(stream, &Packet::Pong { payload }).await
}

pub fn sample_status() -> ServerStatus {
    ServerStatus {
        latency: 12.5,
        players: Players {
            online: 3,
            maximum: 20,
            sample: ["alice", "bob", "carol"]
                .into_iter()
                .map(|name| PlayerSample {
                    uuid: String::new(),
                    name: name.to_owned(),
                })
                .collect(),
        },
        motd: "Test".to_owned(),
        version: Version {
            protocol: 763,
            broadcast: "1.20.1".to_owned(),
        },
    }
}

/// A canned [`StatusQuery`] that counts how often it is asked.
pub struct FakeQuery {
    status: Option<ServerStatus>,
    calls: AtomicUsize,
}

impl FakeQuery {
    pub fn answering(status: ServerStatus) -> Self {
        Self {
            status: Some(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            status: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusQuery for FakeQuery {
    async fn query(&self, _host: &str, _port: u16) -> Result<ServerStatus, Failure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status.clone().ok_or(Failure::TimedOut)
    }
}
