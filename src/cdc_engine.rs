//! Canal CDC engine - subscription and pull-loop processing
//!
//! The engine owns one connector and turns the protocol's pull/ack cycle
//! into a stream of consumer-facing change events:
//! 1. connect, roll back delivery state left over from a prior session
//! 2. optionally subscribe a table filter
//! 3. loop: pull a batch, decode it, forward events, acknowledge
//!
//! A batch is acknowledged only after every one of its events has been
//! delivered into the channel, so a crash mid-batch redelivers it on the
//! next session. There is no automatic reconnection: when the session
//! fails the stream ends and the caller decides what to do.

use crate::config::CanalConfig;
use crate::connector::{CanalConnector, ROLLBACK_ALL};
use crate::error::{CanalError, Result};
use crate::events::{self, ChangeEvent, EntryEvent, OperationType};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// CDC engine settings.
#[derive(Debug, Clone)]
pub struct CdcConfig {
    pub connection: CanalConfig,
    /// Server-side table filter, e.g. `shop\\..*`. None leaves the
    /// server's existing subscription untouched.
    pub filter: Option<String>,
    pub fetch_size: i32,
    /// How long to sleep after an empty pull.
    pub poll_interval: Duration,
    pub include_ddl: bool,
}

impl Default for CdcConfig {
    fn default() -> Self {
        CdcConfig {
            connection: CanalConfig::default(),
            filter: None,
            fetch_size: 100,
            poll_interval: Duration::from_secs(3),
            include_ddl: true,
        }
    }
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Idle,
    Streaming,
    Stopped,
}

/// CDC event receiver handed to the consumer.
pub type CdcEventReceiver = mpsc::UnboundedReceiver<ChangeEvent>;

pub struct CdcEngine {
    config: CdcConfig,
    connector: Option<CanalConnector>,
    state: ProcessingState,
}

impl CdcEngine {
    pub fn new(config: CdcConfig) -> Self {
        CdcEngine {
            config,
            connector: None,
            state: ProcessingState::Idle,
        }
    }

    /// Connects the session and prepares it for streaming.
    pub async fn start(&mut self) -> Result<()> {
        info!(
            "Starting CDC engine against {}:{}",
            self.config.connection.hostname, self.config.connection.port
        );

        let mut connector = CanalConnector::new(self.config.connection.clone());
        connector.connect().await?;
        // Drop delivery state a previous session may have left pending,
        // so the first pull starts from the unconsumed position.
        connector.rollback(ROLLBACK_ALL).await?;

        if let Some(ref filter) = self.config.filter {
            connector.subscribe(filter).await?;
        }

        self.connector = Some(connector);
        self.state = ProcessingState::Streaming;
        info!(
            "CDC engine connected to destination {}",
            self.config.connection.destination
        );
        Ok(())
    }

    /// Moves the connector into a background task that pulls batches and
    /// forwards decoded change events. The stream ends when the receiver
    /// is dropped or the session fails; either way the session is
    /// disconnected best-effort on the way out.
    pub fn stream_events(&mut self) -> Result<CdcEventReceiver> {
        let mut connector = self.connector.take().ok_or(CanalError::NotConnected)?;
        let fetch_size = self.config.fetch_size;
        let poll_interval = self.config.poll_interval;
        let include_ddl = self.config.include_ddl;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            match Self::pump(&mut connector, &tx, fetch_size, poll_interval, include_ddl).await {
                Err(CanalError::ChannelClosed) => {
                    info!("Event receiver dropped, ending canal stream")
                }
                Err(e) => error!("Canal stream ended: {}", e),
                Ok(()) => unreachable!("pump loops until an error ends it"),
            }
            if let Err(e) = connector.disconnect().await {
                warn!("Disconnect after stream end failed: {}", e);
            }
        });

        Ok(rx)
    }

    async fn pump(
        connector: &mut CanalConnector,
        tx: &mpsc::UnboundedSender<ChangeEvent>,
        fetch_size: i32,
        poll_interval: Duration,
        include_ddl: bool,
    ) -> Result<()> {
        loop {
            let batch = connector.get_without_ack(fetch_size).await?;
            if batch.is_empty() {
                debug!("No pending entries, sleeping {:?}", poll_interval);
                tokio::time::sleep(poll_interval).await;
                continue;
            }

            let batch_id = batch.batch_id;
            let mut delivered = 0usize;
            for (entry, event) in events::decode_batch(&batch)? {
                // Transaction markers, heartbeats and GTID logs carry no
                // row data for the consumer.
                let EntryEvent::RowChange(change) = event else {
                    continue;
                };
                let Some(header) = entry.header.as_ref() else {
                    continue;
                };

                for change_event in events::row_change_to_events(header, &change)? {
                    if change_event.op == OperationType::Ddl && !include_ddl {
                        continue;
                    }
                    tx.send(change_event)
                        .map_err(|_| CanalError::ChannelClosed)?;
                    delivered += 1;
                }
            }

            connector.ack(batch_id).await?;
            debug!("Acknowledged batch {} ({} events)", batch_id, delivered);
        }
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    /// Stops the engine and disconnects if the connector was not already
    /// moved into a stream.
    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping CDC engine");
        if let Some(mut connector) = self.connector.take() {
            connector.disconnect().await?;
        }
        self.state = ProcessingState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{
        Ack, ClientAck, ClientRollback, Column, Entry, EntryType, EventType, Get, Handshake,
        Header, Messages, Packet, PacketType, RowChange, RowData,
    };
    use crate::protocol::{read_frame, write_frame};
    use prost::Message;
    use tokio::net::{TcpListener, TcpStream};

    async fn send_packet(stream: &mut TcpStream, packet_type: PacketType, body: Vec<u8>) {
        let packet = Packet {
            r#type: packet_type as i32,
            body,
            ..Default::default()
        };
        write_frame(stream, &packet.encode_to_vec()).await.unwrap();
    }

    async fn recv_packet(stream: &mut TcpStream) -> Packet {
        let payload = read_frame(stream).await.unwrap();
        Packet::decode(payload.as_slice()).unwrap()
    }

    fn insert_entry(table: &str, value: &str) -> Entry {
        let change = RowChange {
            event_type: Some(EventType::Insert as i32),
            row_datas: vec![RowData {
                after_columns: vec![Column {
                    index: 0,
                    name: "id".to_string(),
                    is_key: true,
                    value: value.to_string(),
                    mysql_type: "bigint(20)".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        Entry {
            header: Some(Header {
                schema_name: "test".to_string(),
                table_name: table.to_string(),
                ..Default::default()
            }),
            entry_type: Some(EntryType::RowData as i32),
            store_value: change.encode_to_vec(),
        }
    }

    #[test]
    fn test_engine_starts_idle() {
        let engine = CdcEngine::new(CdcConfig::default());
        assert_eq!(engine.state(), ProcessingState::Idle);
    }

    #[tokio::test]
    async fn test_engine_streams_and_acks_a_batch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            // Connect preamble.
            send_packet(
                &mut stream,
                PacketType::Handshake,
                Handshake::default().encode_to_vec(),
            )
            .await;
            let packet = recv_packet(&mut stream).await;
            assert_eq!(packet.r#type, PacketType::ClientAuthentication as i32);
            send_packet(&mut stream, PacketType::Ack, Ack::default().encode_to_vec()).await;

            // Engine resets pending delivery state first.
            let packet = recv_packet(&mut stream).await;
            assert_eq!(packet.r#type, PacketType::ClientRollback as i32);
            let rollback = ClientRollback::decode(packet.body.as_slice()).unwrap();
            assert_eq!(rollback.batch_id, 0);

            // Then subscribes the configured filter.
            let packet = recv_packet(&mut stream).await;
            assert_eq!(packet.r#type, PacketType::Subscription as i32);
            send_packet(&mut stream, PacketType::Ack, Ack::default().encode_to_vec()).await;

            // One pulled batch with two inserts.
            let packet = recv_packet(&mut stream).await;
            assert_eq!(packet.r#type, PacketType::Get as i32);
            let get = Get::decode(packet.body.as_slice()).unwrap();
            assert_eq!(get.fetch_size, 32);
            let batch = Messages {
                batch_id: 7,
                messages: vec![
                    insert_entry("users", "1").encode_to_vec(),
                    insert_entry("users", "2").encode_to_vec(),
                ],
            };
            send_packet(&mut stream, PacketType::Messages, batch.encode_to_vec()).await;

            // The batch is acknowledged only after delivery.
            let packet = recv_packet(&mut stream).await;
            assert_eq!(packet.r#type, PacketType::ClientAck as i32);
            let client_ack = ClientAck::decode(packet.body.as_slice()).unwrap();
            assert_eq!(client_ack.batch_id, 7);

            // Session ends here; the stream observes the closed socket.
        });

        let config = CdcConfig {
            connection: CanalConfig {
                hostname: addr.ip().to_string(),
                port: addr.port(),
                ..Default::default()
            },
            filter: Some("test\\..*".to_string()),
            fetch_size: 32,
            poll_interval: Duration::from_millis(10),
            include_ddl: true,
        };

        let mut engine = CdcEngine::new(config);
        engine.start().await.unwrap();
        assert_eq!(engine.state(), ProcessingState::Streaming);

        let mut events = engine.stream_events().unwrap();
        let first = events.recv().await.unwrap();
        assert_eq!(first.op, OperationType::Insert);
        assert_eq!(first.table, "users");
        let second = events.recv().await.unwrap();
        assert_eq!(second.after.unwrap()["id"].value.as_deref(), Some("2"));

        // After the server goes away the stream terminates.
        assert!(events.recv().await.is_none());

        server.await.unwrap();
        engine.stop().await.unwrap();
        assert_eq!(engine.state(), ProcessingState::Stopped);
    }
}
