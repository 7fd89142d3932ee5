//! Canal session connector
//!
//! One connector owns one TCP session and drives it through the
//! protocol's states: disconnected, connected (after the handshake/auth
//! exchange), optionally subscribed. The protocol is strictly
//! half-duplex request/response, so every operation takes `&mut self`
//! and runs one full write-then-read exchange; the borrow checker rules
//! out a second in-flight request on the same connector. Independent
//! connectors are fully isolated from each other.
//!
//! There is no retry or reconnection here. A protocol-level failure
//! leaves the session connected (the transport is presumed usable); a
//! transport-level failure drops the channel, and the caller must
//! reconnect before further use.

use crate::auth;
use crate::config::CanalConfig;
use crate::error::{CanalError, Result};
use crate::proto::{
    Ack, ClientAck, ClientRollback, Get, Handshake, Messages, Packet, PacketType, Sub, Unsub,
    EMPTY_BATCH_ID,
};
use crate::protocol::PacketChannel;
use prost::Message;
use tracing::{debug, info, warn};

/// Rolls back all unacknowledged delivery state for the client.
pub const ROLLBACK_ALL: i64 = 0;

pub struct CanalConnector {
    config: CanalConfig,
    channel: Option<PacketChannel>,
    subscribed: bool,
    filter: String,
}

impl CanalConnector {
    pub fn new(config: CanalConfig) -> Self {
        CanalConnector {
            config,
            channel: None,
            subscribed: false,
            filter: String::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Advisory only: the server does not require a subscription before
    /// pulling.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Opens the session: TCP connect, server handshake, client auth,
    /// server ack. A no-op when already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Ok(());
        }

        let mut channel =
            PacketChannel::connect(&self.config.hostname, self.config.port).await?;
        Self::authenticate(&mut channel, &self.config).await?;
        self.channel = Some(channel);

        info!(
            "Connected to canal destination {} as client {}",
            self.config.destination, self.config.client_id
        );
        Ok(())
    }

    async fn authenticate(channel: &mut PacketChannel, config: &CanalConfig) -> Result<()> {
        let packet = channel.read_packet().await?;
        let packet_type = PacketType::try_from(packet.r#type).map_err(|_| {
            CanalError::Protocol(format!("unrecognized packet type {}", packet.r#type))
        })?;
        if packet_type != PacketType::Handshake {
            return Err(CanalError::Protocol(format!(
                "expected HANDSHAKE as first packet, got {:?}",
                packet_type
            )));
        }
        let handshake =
            Handshake::decode(packet.body.as_slice()).map_err(|e| CanalError::MalformedPayload {
                context: "handshake body".to_string(),
                reason: e.to_string(),
            })?;
        debug!(
            "Handshake received, encoding {}",
            handshake.communication_encoding()
        );

        let client_auth = auth::build_client_auth(config, &handshake);
        channel
            .write_packet(&make_packet(PacketType::ClientAuthentication, &client_auth))
            .await?;

        let ack = channel.read_ack().await?;
        if ack.error_code() > 0 {
            return Err(CanalError::Authentication(ack.error_message));
        }
        Ok(())
    }

    /// Subscribes this client to a server-side table filter. An empty
    /// filter behaves as "all tables".
    pub async fn subscribe(&mut self, filter: &str) -> Result<()> {
        let body = Sub {
            destination: self.config.destination.clone(),
            client_id: self.config.client_id.clone(),
            filter: filter.to_string(),
        };
        let ack = self
            .exchange_for_ack(make_packet(PacketType::Subscription, &body))
            .await?;
        if ack.error_code() > 0 {
            return Err(CanalError::Protocol(ack.error_message));
        }

        self.subscribed = true;
        self.filter = filter.to_string();
        debug!("Subscribed with filter {:?}", filter);
        Ok(())
    }

    pub async fn unsubscribe(&mut self) -> Result<()> {
        let body = Unsub {
            destination: self.config.destination.clone(),
            client_id: self.config.client_id.clone(),
            filter: self.filter.clone(),
        };
        let ack = self
            .exchange_for_ack(make_packet(PacketType::Unsubscription, &body))
            .await?;
        if ack.error_code() > 0 {
            return Err(CanalError::Protocol(ack.error_message));
        }

        self.subscribed = false;
        self.filter.clear();
        Ok(())
    }

    /// Pulls one batch without acknowledging it. The batch stays pending
    /// on the server until `ack` or `rollback` resolves it, which is what
    /// gives callers at-least-once delivery under their own commit
    /// points.
    ///
    /// A `Messages` with `batch_id == -1` means no data is currently
    /// available and must not be acknowledged.
    pub async fn get_without_ack(&mut self, fetch_size: i32) -> Result<Messages> {
        let body = Get {
            destination: self.config.destination.clone(),
            client_id: self.config.client_id.clone(),
            fetch_size,
            // -1 sentinels: no server-side timeout control.
            timeout: Some(-1),
            unit: Some(-1),
            auto_ack: Some(false),
        };
        let packet = make_packet(PacketType::Get, &body);

        let result = async {
            let channel = self.channel.as_mut().ok_or(CanalError::NotConnected)?;
            channel.write_packet(&packet).await?;
            let reply = channel.read_packet().await?;
            receive_messages(reply)
        }
        .await;
        self.track_transport_failure(result)
    }

    /// Pull plus immediate acknowledgment of the returned batch. This
    /// discards the at-least-once guarantee if the caller crashes between
    /// receiving and processing; use `get_without_ack` plus an explicit
    /// `ack` to keep it.
    pub async fn get(&mut self, fetch_size: i32) -> Result<Messages> {
        let messages = self.get_without_ack(fetch_size).await?;
        if messages.batch_id != EMPTY_BATCH_ID {
            self.ack(messages.batch_id).await?;
        }
        Ok(messages)
    }

    /// Acknowledges a pulled batch. Fire-and-forget: the protocol defines
    /// no reply to a client ack.
    pub async fn ack(&mut self, batch_id: i64) -> Result<()> {
        if batch_id == EMPTY_BATCH_ID {
            return Err(CanalError::Protocol(
                "cannot acknowledge the empty-batch sentinel".to_string(),
            ));
        }

        let body = ClientAck {
            destination: self.config.destination.clone(),
            client_id: self.config.client_id.clone(),
            batch_id,
        };
        let packet = make_packet(PacketType::ClientAck, &body);

        let result = async {
            let channel = self.channel.as_mut().ok_or(CanalError::NotConnected)?;
            channel.write_packet(&packet).await
        }
        .await;
        self.track_transport_failure(result)
    }

    /// Asks the server to redeliver a batch on the next pull, or with
    /// [`ROLLBACK_ALL`] to drop every unacknowledged batch for this
    /// client. Fire-and-forget like `ack`.
    pub async fn rollback(&mut self, batch_id: i64) -> Result<()> {
        let packet = rollback_packet(&self.config, batch_id);

        let result = async {
            let channel = self.channel.as_mut().ok_or(CanalError::NotConnected)?;
            channel.write_packet(&packet).await
        }
        .await;
        self.track_transport_failure(result)
    }

    /// Closes the session. Best-effort: outstanding delivery state is
    /// rolled back first, but the socket is released on every exit path
    /// even when that rollback fails. A no-op when not connected.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(mut channel) = self.channel.take() else {
            return Ok(());
        };
        self.subscribed = false;
        self.filter.clear();

        if let Err(e) = channel
            .write_packet(&rollback_packet(&self.config, ROLLBACK_ALL))
            .await
        {
            warn!("Rollback during disconnect failed: {}", e);
        }
        if let Err(e) = channel.shutdown().await {
            debug!("Socket shutdown failed: {}", e);
        }

        info!("Disconnected from {}", self.config.destination);
        Ok(())
    }

    /// Runs the write-then-read exchange that every ACK-answered request
    /// shares.
    async fn exchange_for_ack(&mut self, packet: Packet) -> Result<Ack> {
        let result = async {
            let channel = self.channel.as_mut().ok_or(CanalError::NotConnected)?;
            channel.write_packet(&packet).await?;
            channel.read_ack().await
        }
        .await;
        self.track_transport_failure(result)
    }

    /// A failed transport means the session is gone: drop the channel so
    /// state reads DISCONNECTED and the caller reconnects. Protocol and
    /// decode failures keep the channel, the transport is still usable.
    fn track_transport_failure<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(CanalError::Transport(_)) = &result {
            self.channel = None;
            self.subscribed = false;
        }
        result
    }
}

fn make_packet(packet_type: PacketType, body: &impl Message) -> Packet {
    Packet {
        r#type: packet_type as i32,
        body: body.encode_to_vec(),
        ..Default::default()
    }
}

fn rollback_packet(config: &CanalConfig, batch_id: i64) -> Packet {
    let body = ClientRollback {
        destination: config.destination.clone(),
        client_id: config.client_id.clone(),
        batch_id,
    };
    make_packet(PacketType::ClientRollback, &body)
}

/// Interprets the reply to a GET. The server reports pull errors through
/// an ACK packet instead of the expected MESSAGES packet.
fn receive_messages(packet: Packet) -> Result<Messages> {
    let packet_type = PacketType::try_from(packet.r#type)
        .map_err(|_| CanalError::Protocol(format!("unrecognized packet type {}", packet.r#type)))?;

    match packet_type {
        PacketType::Messages => {
            Messages::decode(packet.body.as_slice()).map_err(|e| CanalError::MalformedPayload {
                context: "messages body".to_string(),
                reason: e.to_string(),
            })
        }
        PacketType::Ack => {
            let ack =
                Ack::decode(packet.body.as_slice()).map_err(|e| CanalError::MalformedPayload {
                    context: "ack body".to_string(),
                    reason: e.to_string(),
                })?;
            Err(CanalError::Protocol(ack.error_message))
        }
        other => Err(CanalError::Protocol(format!(
            "unexpected packet type {:?} in reply to GET",
            other
        ))),
    }
}
