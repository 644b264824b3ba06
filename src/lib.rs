#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Reachability checks for Minecraft Java edition servers.
//!
//! A run first makes sure the port accepts TCP connections
//! ([`port::probe_port`]) and only then asks the server for its status
//! ([`executor::StatusQuery`]). [`probe::run`] ties the two together and
//! produces a [`structures::ProbeReport`].

pub mod cli;
pub mod executor;
pub mod port;
pub mod probe;
pub mod structures;

#[cfg(test)]
mod testing;

#[macro_use]
extern crate tracing;

#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("error connecting to the server: {0}")]
    ConnectionFailed(#[from] pyng::Error),
    #[error("timed out waiting for the server status")]
    TimedOut,
}
