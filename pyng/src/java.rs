//! Implementation of the Java Minecraft ping protocol.
//! [Server List Ping](https://wiki.vg/Server_List_Ping)

use std::time::Duration;

use serde::Deserialize;

use crate::Error;

/// The default port of a Java server, used when no port or SRV record is found.
pub const DEFAULT_PORT: u16 = 25565;

/// The protocol version sent in the handshake.
///
/// Servers answer status requests regardless of the version a client claims.
pub const PROTOCOL_VERSION: i32 = 47;

/// Largest frame a server may send, the maximum value of a three byte VarInt.
pub const MAX_PACKET_LENGTH: usize = 2_097_151;

const NEXT_STATE_STATUS: i32 = 1;

/// Configuration for pinging a Java server.
///
/// # Examples
///
/// ```
/// use pyng::Java;
/// use std::time::Duration;
///
/// let java_config = Java {
///     server_address: "mc.hypixel.net".to_string(),
///     timeout: Some(Duration::from_secs(10)),
/// };
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Java {
    /// The java server address.
    ///
    /// This can be either an IP or a hostname, and both may optionally have a
    /// port at the end. IPv6 addresses with a port must be bracketed.
    ///
    /// DNS resolution will be performed on hostnames.
    ///
    /// # Examples
    ///
    /// ```text
    /// test.server.com
    /// test.server.com:19384
    /// 13.212.76.209
    /// 13.212.76.209:23193
    /// [::1]:25565
    /// ```
    pub server_address: String,
    /// The timeout applied to connecting and to every read and write.
    pub timeout: Option<Duration>,
}

impl Java {
    /// Split [`Self::server_address`] into a host and an optional port.
    ///
    /// # Errors
    /// If the address is empty, has an empty host, or carries a port that is not a `u16`.
    pub fn host_and_port(&self) -> Result<(String, Option<u16>), Error> {
        split_address(&self.server_address)
    }
}

fn split_address(address: &str) -> Result<(String, Option<u16>), Error> {
    let address = address.trim();
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or(Error::InvalidAddress)?;
        if host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(port.parse().map_err(|_| Error::InvalidAddress)?),
            None if tail.is_empty() => None,
            None => return Err(Error::InvalidAddress),
        };
        return Ok((host.to_owned(), port));
    }
    // A bare IPv6 literal has more than one colon and no port.
    if address.matches(':').count() > 1 {
        return Ok((address.to_owned(), None));
    }
    let (host, port) = match address.split_once(':') {
        Some((host, port)) => (host, Some(port.parse().map_err(|_| Error::InvalidAddress)?)),
        None => (address, None),
    };
    if host.is_empty() {
        return Err(Error::InvalidAddress);
    }
    Ok((host.to_owned(), port))
}

#[derive(Deserialize, Debug, Clone)]
pub struct ForgeModMetadata {
    pub modid: String,
    pub version: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ForgeModInfoList {
    #[serde(rename = "modList")]
    pub mod_list: Vec<ForgeModMetadata>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ModInfo {
    #[serde(rename = "FML")]
    Fml(ForgeModInfoList),
    #[serde(other)]
    Other,
}

/// The server status reponse
///
/// More information can be found [here](https://wiki.vg/Server_List_Ping).
#[derive(Deserialize, Debug, Clone)]
pub struct JavaResponse {
    /// The version of the server.
    pub version: Version,
    /// Information about online players
    pub players: Players,
    /// The description of the server (MOTD).
    pub description: Chat,
    /// The server icon (a Base64-encoded PNG image)
    pub favicon: Option<String>,
    /// Mod information
    pub modinfo: Option<ModInfo>,
    /// Does this server enforce server signing?
    #[serde(rename = "enforcesSecureChat")]
    pub enforces_secure_chat: Option<bool>,
    /// Does this server have chat previews?
    #[serde(rename = "previewsChat")]
    pub previews_chat: Option<bool>,
}

/// Information about the server's version
#[derive(Deserialize, Debug, Clone)]
pub struct Version {
    /// The name of the version the server is running
    ///
    /// In practice this comes in a large variety of different formats.
    pub name: String,
    /// See [Protocol Version Numbers](https://wiki.vg/Protocol_version_numbers)
    pub protocol: i64,
}

/// An online player of the server.
#[derive(Deserialize, Debug, Clone)]
pub struct Player {
    /// The name of the player.
    pub name: String,
    /// The player's UUID
    pub id: String,
}

/// The stats for players on the server.
#[derive(Deserialize, Debug, Clone)]
pub struct Players {
    /// The max amount of players.
    pub max: i64,
    /// The amount of players online.
    pub online: i64,
    /// A preview of which players are online
    ///
    /// In practice servers often don't send this or use it for more advertising
    pub sample: Option<Vec<Player>>,
}

/// A Minecraft chat component, reduced to its text content.
///
/// Styling, translations and click events are ignored.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Chat {
    String(String),
    List(Vec<Chat>),
    Component {
        #[serde(default)]
        text: String,
        #[serde(default)]
        extra: Vec<Chat>,
    },
}

impl Chat {
    /// The plain text of this component and all of its children, in order.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::String(s) => out.push_str(s),
            Self::List(children) => {
                for child in children {
                    child.push_text(out);
                }
            }
            Self::Component { text, extra } => {
                out.push_str(text);
                for child in extra {
                    child.push_text(out);
                }
            }
        }
    }
}

/// Packets of the handshaking and status states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Handshake {
        version: i32,
        host: String,
        port: u16,
        next_state: i32,
    },
    Response {
        response: String,
    },
    Pong {
        payload: u64,
    },
    Request {},
    Ping {
        payload: u64,
    },
}

impl Packet {
    /// The handshake a client sends before requesting the status.
    #[must_use]
    pub fn status_handshake(host: &str, port: u16) -> Self {
        Self::Handshake {
            version: PROTOCOL_VERSION,
            host: host.to_owned(),
            port,
            next_state: NEXT_STATE_STATUS,
        }
    }

    #[must_use]
    pub const fn id(&self) -> i32 {
        match self {
            Self::Handshake { .. } | Self::Response { .. } | Self::Request {} => 0x00,
            Self::Pong { .. } | Self::Ping { .. } => 0x01,
        }
    }

    /// Serialize the packet into a length-prefixed frame.
    ///
    /// # Errors
    /// If a string field is longer than a VarInt can describe.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut body = Vec::new();
        write_varint(&mut body, self.id());
        match self {
            Self::Handshake {
                version,
                host,
                port,
                next_state,
            } => {
                write_varint(&mut body, *version);
                write_string(&mut body, host)?;
                body.extend_from_slice(&port.to_be_bytes());
                write_varint(&mut body, *next_state);
            }
            Self::Response { response } => write_string(&mut body, response)?,
            Self::Pong { payload } | Self::Ping { payload } => {
                body.extend_from_slice(&payload.to_be_bytes());
            }
            Self::Request {} => {}
        }
        let mut frame = Vec::with_capacity(body.len() + 5);
        write_varint(&mut frame, i32::try_from(body.len())?);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decode a packet sent by a server while in the status state.
    ///
    /// # Errors
    /// If the id is unknown or the body is malformed.
    pub fn decode_clientbound(id: i32, mut body: &[u8]) -> Result<Self, Error> {
        let packet = match id {
            0x00 => Self::Response {
                response: read_string(&mut body)?,
            },
            0x01 => Self::Pong {
                payload: read_u64(&mut body)?,
            },
            _ => return Err(Error::InvalidPacket),
        };
        Ok(packet)
    }

    /// Decode a packet sent by a client. `handshaken` selects the status state
    /// over the handshaking state, since both use id `0x00`.
    ///
    /// # Errors
    /// If the id is unknown or the body is malformed.
    pub fn decode_serverbound(id: i32, mut body: &[u8], handshaken: bool) -> Result<Self, Error> {
        let packet = match (id, handshaken) {
            (0x00, false) => Self::Handshake {
                version: read_varint(&mut body)?,
                host: read_string(&mut body)?,
                port: u16::from_be_bytes(take::<2>(&mut body)?),
                next_state: read_varint(&mut body)?,
            },
            (0x00, true) => Self::Request {},
            (0x01, true) => Self::Ping {
                payload: read_u64(&mut body)?,
            },
            _ => return Err(Error::InvalidPacket),
        };
        Ok(packet)
    }
}

pub(crate) fn write_varint(buf: &mut Vec<u8>, value: i32) {
    #[allow(clippy::cast_sign_loss)]
    let mut value = value as u32;
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Fold one VarInt byte into `acc`. Returns `Some` once the final byte is seen.
pub(crate) fn varint_step(acc: &mut u32, position: usize, byte: u8) -> Result<Option<i32>, Error> {
    if position >= 5 {
        return Err(Error::InvalidPacket);
    }
    *acc |= u32::from(byte & 0x7f) << (7 * position);
    if byte & 0x80 == 0 {
        #[allow(clippy::cast_possible_wrap)]
        return Ok(Some(*acc as i32));
    }
    Ok(None)
}

pub(crate) fn read_varint(buf: &mut &[u8]) -> Result<i32, Error> {
    let mut acc = 0;
    for position in 0..=5 {
        let [byte] = take::<1>(buf)?;
        if let Some(value) = varint_step(&mut acc, position, byte)? {
            return Ok(value);
        }
    }
    Err(Error::InvalidPacket)
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<(), Error> {
    write_varint(buf, i32::try_from(s.len())?);
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn read_string(buf: &mut &[u8]) -> Result<String, Error> {
    let len = usize::try_from(read_varint(buf)?)?;
    if len > buf.len() {
        return Err(Error::InvalidPacket);
    }
    let (s, rest) = buf.split_at(len);
    *buf = rest;
    String::from_utf8(s.to_vec()).map_err(|_| Error::InvalidPacket)
}

fn read_u64(buf: &mut &[u8]) -> Result<u64, Error> {
    Ok(u64::from_be_bytes(take::<8>(buf)?))
}

fn take<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N], Error> {
    let (head, rest) = buf.split_first_chunk::<N>().ok_or(Error::InvalidPacket)?;
    *buf = rest;
    Ok(*head)
}
