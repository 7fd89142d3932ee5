//! Canal wire transport
//!
//! Every exchange with the server is one frame: a 4-byte big-endian
//! length prefix followed by exactly that many payload bytes, and the
//! payload is always one encoded `Packet`. The codec accumulates partial
//! reads; a stream that ends inside the prefix or inside the payload is
//! a transport failure, never a short frame. No maximum frame length is
//! enforced beyond what the transport imposes.

use crate::error::{CanalError, Result};
use crate::proto::{Ack, Packet, PacketType};
use byteorder::{BigEndian, WriteBytesExt};
use bytes::Bytes;
use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Writes one length-prefixed frame and flushes it to the transport.
pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut header = Vec::with_capacity(4);
    WriteBytesExt::write_u32::<BigEndian>(&mut header, payload.len() as u32)
        .map_err(|e| CanalError::Transport(format!("Failed to write frame length: {}", e)))?;

    stream
        .write_all(&header)
        .await
        .map_err(|e| CanalError::Transport(format!("Failed to write frame header: {}", e)))?;
    stream
        .write_all(payload)
        .await
        .map_err(|e| CanalError::Transport(format!("Failed to write frame payload: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| CanalError::Transport(format!("Failed to flush frame: {}", e)))?;

    Ok(())
}

/// Reads one full frame, blocking until the length prefix and the whole
/// declared payload have arrived.
pub async fn read_frame<R>(stream: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| CanalError::Transport(format!("Failed to read frame length: {}", e)))?;
    let length = u32::from_be_bytes(len_buf);

    let mut payload = vec![0u8; length as usize];
    stream
        .read_exact(&mut payload)
        .await
        .map_err(|e| CanalError::Transport(format!("Failed to read frame payload: {}", e)))?;

    Ok(payload)
}

/// One TCP session to a canal server, speaking framed packets.
///
/// The channel is exclusively owned by one connector for the lifetime of
/// a session; nothing else touches the raw stream.
pub struct PacketChannel {
    stream: TcpStream,
}

impl PacketChannel {
    pub async fn connect(hostname: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", hostname, port);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| CanalError::Transport(format!("Failed to connect to {}: {}", addr, e)))?;

        debug!("Connected to canal server at {}", addr);

        Ok(PacketChannel { stream })
    }

    /// Reads the next frame and decodes its packet envelope.
    pub async fn read_packet(&mut self) -> Result<Packet> {
        let payload = read_frame(&mut self.stream).await?;
        Packet::decode(Bytes::from(payload)).map_err(|e| CanalError::MalformedPayload {
            context: "packet envelope".to_string(),
            reason: e.to_string(),
        })
    }

    /// Encodes a packet and writes it as one frame.
    pub async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        write_frame(&mut self.stream, &packet.encode_to_vec()).await
    }

    /// Reads the next packet and requires it to be an ACK, returning the
    /// decoded body. How a nonzero error code maps is up to the caller
    /// (authentication vs. plain protocol failure).
    pub async fn read_ack(&mut self) -> Result<Ack> {
        let packet = self.read_packet().await?;
        let packet_type = PacketType::try_from(packet.r#type).map_err(|_| {
            CanalError::Protocol(format!("unrecognized packet type {}", packet.r#type))
        })?;
        if packet_type != PacketType::Ack {
            return Err(CanalError::Protocol(format!(
                "unexpected packet type {:?} when ACK is expected",
                packet_type
            )));
        }

        Ack::decode(packet.body.as_slice()).map_err(|e| CanalError::MalformedPayload {
            context: "ack body".to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| CanalError::Transport(format!("Failed to shut down socket: {}", e)))
    }
}
