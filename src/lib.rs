//! Canal CDC protocol client
//!
//! This library speaks the canal server's TCP protocol to pull database
//! change events (binlog entries). Main pieces:
//! - Length-prefixed packet framing and the protobuf wire schema
//! - Session handshake and (optional) credential authentication
//! - Subscribe / pull / ack / rollback with explicit batch commits
//! - Decoding of pulled entries into typed change events

pub mod auth;
pub mod cdc_engine;
pub mod config;
pub mod connector;
pub mod error;
pub mod events;
pub mod proto;
pub mod protocol;

pub use cdc_engine::{CdcConfig, CdcEngine, CdcEventReceiver};
pub use config::CanalConfig;
pub use connector::CanalConnector;
pub use error::{CanalError, Result};
pub use events::{ChangeEvent, ColumnValue, EntryEvent, OperationType};
