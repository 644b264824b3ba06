#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
//! `pyng` provides the Minecraft Java edition Server List Ping protocol. It can
//! be used to ping servers and collect information such as the MOTD, max player
//! count, online player sample and version.
//!
//! Hostnames without a port get an SRV lookup (`_minecraft._tcp.<host>`) before
//! falling back to the default port. The implementation runs on tokio.
//!
//! The main API surface is [`tokio::get_status`].

pub mod tokio;

mod java;

pub use java::{
    Chat, DEFAULT_PORT, Java, JavaResponse, MAX_PACKET_LENGTH, ModInfo, PROTOCOL_VERSION, Packet,
    Player, Players, Version,
};

/// Errors that can occur when pinging a server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("an invalid packet configuration was sent")]
    InvalidPacket,
    #[error("VarInt length was negative or too large")]
    InvalidVarInt(#[from] std::num::TryFromIntError),
    #[error("an I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),
    #[error("a JSON error occurred: {0}")]
    JsonErr(#[from] serde_json::Error),
    #[error("an invalid address was provided")]
    InvalidAddress,
    #[error("DNS lookup for the host provided failed")]
    DnsLookupFailed,
    #[error("the server did not respond in time")]
    Timeout,
}
