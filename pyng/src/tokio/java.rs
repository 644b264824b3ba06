use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    time::{Duration, Instant},
};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tracing::{debug, trace};

use super::AsyncPingable;
use crate::{
    Error, Java, JavaResponse, Packet,
    java::{DEFAULT_PORT, MAX_PACKET_LENGTH, read_varint, varint_step},
};

impl AsyncPingable for Java {
    type Response = JavaResponse;

    async fn ping(self) -> Result<(Duration, Self::Response), Error> {
        let (host, port) = self.host_and_port()?;
        let (connect_host, port) = resolve_target(&host, port).await;
        let timeout = self.timeout;

        let mut stream = bounded(timeout, connect(&connect_host, port)).await?;
        trace!(%connect_host, port, "connected, sending handshake");
        bounded(
            timeout,
            write_packet(&mut stream, &Packet::status_handshake(&host, port)),
        )
        .await?;
        bounded(timeout, write_packet(&mut stream, &Packet::Request {})).await?;

        let Packet::Response { response } = bounded(timeout, read_clientbound(&mut stream)).await?
        else {
            return Err(Error::InvalidPacket);
        };
        let response: JavaResponse = serde_json::from_str(&response)?;

        let payload: u64 = rand::random();
        let start = Instant::now();
        bounded(timeout, write_packet(&mut stream, &Packet::Ping { payload })).await?;
        let pong = bounded(timeout, read_clientbound(&mut stream)).await?;
        let latency = start.elapsed();
        if pong != (Packet::Pong { payload }) {
            debug!(?pong, "server answered ping with a mismatched packet");
            return Err(Error::InvalidPacket);
        }

        Ok((latency, response))
    }
}

async fn bounded<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout)?,
        None => fut.await,
    }
}

/// Pick the host and port to connect to. Without an explicit port the SRV
/// record is consulted, then [`DEFAULT_PORT`].
async fn resolve_target(host: &str, port: Option<u16>) -> (String, u16) {
    match port {
        Some(port) => (host.to_owned(), port),
        None => srv_lookup(host)
            .await
            .unwrap_or_else(|| (host.to_owned(), DEFAULT_PORT)),
    }
}

/// Look up the `_minecraft._tcp` SRV record of a hostname.
async fn srv_lookup(host: &str) -> Option<(String, u16)> {
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }
    let lookup = match super::resolver()
        .srv_lookup(format!("_minecraft._tcp.{host}"))
        .await
    {
        Ok(lookup) => lookup,
        Err(error) => {
            trace!(%host, %error, "no SRV record");
            return None;
        }
    };
    let record = lookup.iter().next()?;
    let target = record.target().to_utf8();
    debug!(%host, %target, port = record.port(), "using SRV record");
    Some((target.trim_end_matches('.').to_owned(), record.port()))
}

async fn connect(host: &str, port: u16) -> Result<TcpStream, Error> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| Error::DnsLookupFailed)?
        .collect();
    if addrs.is_empty() {
        return Err(Error::DnsLookupFailed);
    }
    Ok(TcpStream::connect(addrs.as_slice()).await?)
}

async fn read_clientbound<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, Error> {
    let (id, body) = read_frame(reader).await?;
    Packet::decode_clientbound(id, &body)
}

async fn read_varint_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, Error> {
    let mut acc = 0;
    for position in 0..=5 {
        let byte = reader.read_u8().await?;
        if let Some(value) = varint_step(&mut acc, position, byte)? {
            return Ok(value);
        }
    }
    Err(Error::InvalidPacket)
}

/// Read one length-prefixed frame, returning the packet id and the remaining body.
///
/// # Errors
/// If the stream ends early, or the frame is empty or longer than [`MAX_PACKET_LENGTH`].
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(i32, Vec<u8>), Error> {
    let len = usize::try_from(read_varint_async(reader).await?)?;
    if len == 0 || len > MAX_PACKET_LENGTH {
        return Err(Error::InvalidPacket);
    }
    let mut frame = vec![0; len];
    reader.read_exact(&mut frame).await?;
    let mut body = frame.as_slice();
    let id = read_varint(&mut body)?;
    Ok((id, body.to_vec()))
}

/// Write a packet as a single frame and flush it.
///
/// # Errors
/// If the packet cannot be encoded or the write fails.
pub async fn write_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &Packet,
) -> Result<(), Error> {
    writer.write_all(&packet.encode()?).await?;
    writer.flush().await?;
    Ok(())
}
