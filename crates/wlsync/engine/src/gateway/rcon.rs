//! Minecraft RCON client
//!
//! Packet layout, all integers little-endian:
//!
//! ```text
//! i32 length | i32 request id | i32 type | body bytes | 0x00 | 0x00
//! ```
//!
//! `length` counts everything after itself. A login is answered with an
//! auth response carrying our request id, or `-1` when the password is
//! wrong. A command is answered with a response packet echoing its id.

use super::retrying::{CommandChannel, RconConnector};
use super::{GatewayError, GatewayResult};
use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Largest body the server sends in one packet
pub const MAX_PAYLOAD: usize = 4096;

/// id + type + two terminating NULs
const HEADER_LEN: usize = 10;

/// Packet type field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketKind(pub i32);

impl PacketKind {
    pub const RESPONSE: PacketKind = PacketKind(0);
    pub const COMMAND: PacketKind = PacketKind(2);
    pub const AUTH_RESPONSE: PacketKind = PacketKind(2);
    pub const LOGIN: PacketKind = PacketKind(3);
}

/// One RCON packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub kind: PacketKind,
    pub body: String,
}

impl Packet {
    pub fn new(request_id: i32, kind: PacketKind, body: impl Into<String>) -> Self {
        Self {
            request_id,
            kind,
            body: body.into(),
        }
    }

    pub fn encode(&self) -> GatewayResult<Bytes> {
        let body = self.body.as_bytes();
        if body.len() > MAX_PAYLOAD {
            return Err(GatewayError::Protocol(format!(
                "payload of {} bytes exceeds {MAX_PAYLOAD}",
                body.len()
            )));
        }

        let length = (HEADER_LEN + body.len()) as i32;
        let mut buf = BytesMut::with_capacity(4 + HEADER_LEN + body.len());
        buf.put_i32_le(length);
        buf.put_i32_le(self.request_id);
        buf.put_i32_le(self.kind.0);
        buf.put_slice(body);
        buf.put_u8(0);
        buf.put_u8(0);
        Ok(buf.freeze())
    }

    pub async fn read_from<R>(reader: &mut R) -> GatewayResult<Self>
    where
        R: AsyncRead + Unpin,
    {
        let length = reader.read_i32_le().await?;
        let length = usize::try_from(length)
            .ok()
            .filter(|len| (HEADER_LEN..=HEADER_LEN + MAX_PAYLOAD).contains(len))
            .ok_or_else(|| GatewayError::Protocol(format!("invalid packet length {length}")))?;

        let mut raw = vec![0u8; length];
        reader.read_exact(&mut raw).await?;

        let mut buf = Bytes::from(raw);
        let request_id = buf.get_i32_le();
        let kind = PacketKind(buf.get_i32_le());
        let body = buf.slice(..buf.len() - 2);
        let body = String::from_utf8_lossy(&body).into_owned();

        Ok(Self {
            request_id,
            kind,
            body,
        })
    }
}

/// Authenticated RCON session
pub struct RconConnection<S = TcpStream> {
    stream: S,
    next_id: i32,
}

impl<S> RconConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Authenticate over an open stream.
    pub async fn login(stream: S, password: &str) -> GatewayResult<Self> {
        let mut conn = Self { stream, next_id: 1 };
        let id = conn.next_request_id();
        conn.write(&Packet::new(id, PacketKind::LOGIN, password))
            .await?;

        loop {
            let packet = Packet::read_from(&mut conn.stream).await?;
            if packet.request_id == -1 {
                return Err(GatewayError::Auth("password rejected".to_string()));
            }
            if packet.kind == PacketKind::AUTH_RESPONSE && packet.request_id == id {
                return Ok(conn);
            }
            // Some servers send an empty response before the auth result.
        }
    }

    /// Run one console command and return its output.
    pub async fn execute(&mut self, command: &str) -> GatewayResult<String> {
        let id = self.next_request_id();
        self.write(&Packet::new(id, PacketKind::COMMAND, command))
            .await?;

        loop {
            let packet = Packet::read_from(&mut self.stream).await?;
            if packet.request_id == id && packet.kind == PacketKind::RESPONSE {
                return Ok(packet.body);
            }
            tracing::debug!(
                request_id = packet.request_id,
                expected = id,
                "skipping stale rcon packet"
            );
        }
    }

    fn next_request_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    async fn write(&mut self, packet: &Packet) -> GatewayResult<()> {
        let bytes = packet.encode()?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<S> CommandChannel for RconConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn execute(&mut self, command: &str) -> GatewayResult<String> {
        RconConnection::execute(self, command).await
    }
}

/// Opens RCON sessions over TCP
#[derive(Debug, Clone)]
pub struct TcpRconConnector {
    addr: String,
    password: String,
}

impl TcpRconConnector {
    pub fn new(addr: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl RconConnector for TcpRconConnector {
    type Channel = RconConnection<TcpStream>;

    async fn connect(&self) -> GatewayResult<Self::Channel> {
        tracing::info!(addr = %self.addr, "connecting to rcon");
        let stream = TcpStream::connect(&self.addr).await?;
        RconConnection::login(stream, &self.password).await
    }
}
