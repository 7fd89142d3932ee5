//! Decoding of pulled entries into typed change events
//!
//! A pulled batch carries opaque `Entry` bytes. `decode_entry` opens the
//! envelope and `decode_event` dispatches on the entry type to the right
//! store-value schema. On top of that sits the consumer-facing
//! `ChangeEvent` view: one record per changed row, keyed by column name,
//! ready for serialization into a sink.

use crate::error::{CanalError, Result};
use crate::proto::{
    Column, Entry, EntryType, EventType, Header, Messages, RowChange, TransactionBegin,
    TransactionEnd,
};
use chrono::{DateTime, TimeZone, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded entry payload, keyed by the entry type on the envelope.
///
/// Heartbeat and GTID log entries need no payload decoding here; their
/// store value passes through opaque.
#[derive(Debug, Clone)]
pub enum EntryEvent {
    TransactionBegin(TransactionBegin),
    RowChange(RowChange),
    TransactionEnd(TransactionEnd),
    Heartbeat(Vec<u8>),
    GtidLog(Vec<u8>),
}

/// Decodes one raw element of a pulled batch into its entry envelope.
pub fn decode_entry(bytes: &[u8]) -> Result<Entry> {
    Entry::decode(bytes).map_err(|e| CanalError::MalformedPayload {
        context: "entry envelope".to_string(),
        reason: e.to_string(),
    })
}

/// Decodes an entry's store value according to its entry type.
///
/// Failures carry the entry's header context and are never retried; the
/// bytes cannot change.
pub fn decode_event(entry: &Entry) -> Result<EntryEvent> {
    let header = entry.header.as_ref();
    let raw_type = entry.entry_type.unwrap_or(EntryType::RowData as i32);
    let entry_type = EntryType::try_from(raw_type)
        .map_err(|_| malformed(header, format!("unrecognized entry type {}", raw_type)))?;

    match entry_type {
        EntryType::TransactionBegin => TransactionBegin::decode(entry.store_value.as_slice())
            .map(EntryEvent::TransactionBegin)
            .map_err(|e| malformed(header, e.to_string())),
        EntryType::RowData => RowChange::decode(entry.store_value.as_slice())
            .map(EntryEvent::RowChange)
            .map_err(|e| malformed(header, e.to_string())),
        EntryType::TransactionEnd => TransactionEnd::decode(entry.store_value.as_slice())
            .map(EntryEvent::TransactionEnd)
            .map_err(|e| malformed(header, e.to_string())),
        EntryType::Heartbeat => Ok(EntryEvent::Heartbeat(entry.store_value.clone())),
        EntryType::GtidLog => Ok(EntryEvent::GtidLog(entry.store_value.clone())),
        EntryType::CompatibleProto2 => {
            Err(malformed(header, "reserved entry type 0".to_string()))
        }
    }
}

/// Decodes every entry of a pulled batch.
pub fn decode_batch(messages: &Messages) -> Result<Vec<(Entry, EntryEvent)>> {
    let mut decoded = Vec::with_capacity(messages.messages.len());
    for raw in &messages.messages {
        let entry = decode_entry(raw)?;
        let event = decode_event(&entry)?;
        decoded.push((entry, event));
    }
    Ok(decoded)
}

fn malformed(header: Option<&Header>, reason: String) -> CanalError {
    CanalError::MalformedPayload {
        context: header_context(header),
        reason,
    }
}

fn header_context(header: Option<&Header>) -> String {
    match header {
        Some(h) => format!(
            "entry {}:{} {}.{}",
            h.logfile_name, h.logfile_offset, h.schema_name, h.table_name
        ),
        None => "entry without header".to_string(),
    }
}

/// One column's value in a consumer-facing change event. `value` is
/// `None` for SQL NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnValue {
    pub value: Option<String>,
    pub mysql_type: String,
    pub is_key: bool,
    pub updated: bool,
}

/// Change operation type as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Insert,
    Update,
    Delete,
    Ddl,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "INSERT",
            OperationType::Update => "UPDATE",
            OperationType::Delete => "DELETE",
            OperationType::Ddl => "DDL",
        }
    }
}

/// Consumer-facing view of one changed row (or one DDL statement).
///
/// `before` is absent for INSERT, `after` is absent for DELETE, both are
/// present for UPDATE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub gtid: Option<String>,
    pub op: OperationType,
    pub timestamp: DateTime<Utc>,
    pub database: String,
    pub table: String,
    pub before: Option<HashMap<String, ColumnValue>>,
    pub after: Option<HashMap<String, ColumnValue>>,
    /// Statement text for DDL/query events.
    pub query: Option<String>,
}

/// Converts one decoded row change into consumer events, one per row.
///
/// DDL and query events produce a single event carrying the statement
/// text. Row-level bookkeeping types (GTID markers, XA votes, master
/// heartbeats) produce nothing.
pub fn row_change_to_events(header: &Header, change: &RowChange) -> Result<Vec<ChangeEvent>> {
    let raw_type = change.event_type.unwrap_or(EventType::Update as i32);
    let event_type = EventType::try_from(raw_type).map_err(|_| {
        malformed(
            Some(header),
            format!("unrecognized event type {}", raw_type),
        )
    })?;

    let timestamp = Utc
        .timestamp_millis_opt(header.execute_time)
        .single()
        .unwrap_or_default();
    let gtid = if header.gtid.is_empty() {
        None
    } else {
        Some(header.gtid.clone())
    };

    if change.is_ddl() || is_statement_event(event_type) {
        let database = change
            .ddl_schema_name
            .clone()
            .unwrap_or_else(|| header.schema_name.clone());
        return Ok(vec![ChangeEvent {
            gtid,
            op: OperationType::Ddl,
            timestamp,
            database,
            table: header.table_name.clone(),
            before: None,
            after: None,
            query: Some(change.sql.clone()),
        }]);
    }

    let op = match event_type {
        EventType::Insert => OperationType::Insert,
        EventType::Update => OperationType::Update,
        EventType::Delete => OperationType::Delete,
        _ => return Ok(Vec::new()),
    };

    let events = change
        .row_datas
        .iter()
        .map(|row| ChangeEvent {
            gtid: gtid.clone(),
            op,
            timestamp,
            database: header.schema_name.clone(),
            table: header.table_name.clone(),
            before: match op {
                OperationType::Insert => None,
                _ => Some(column_map(&row.before_columns)),
            },
            after: match op {
                OperationType::Delete => None,
                _ => Some(column_map(&row.after_columns)),
            },
            query: None,
        })
        .collect();

    Ok(events)
}

fn is_statement_event(event_type: EventType) -> bool {
    matches!(
        event_type,
        EventType::Create
            | EventType::Alter
            | EventType::Erase
            | EventType::Query
            | EventType::Truncate
            | EventType::Rename
            | EventType::CIndex
            | EventType::DIndex
    )
}

fn column_map(columns: &[Column]) -> HashMap<String, ColumnValue> {
    columns
        .iter()
        .map(|column| {
            (
                column.name.clone(),
                ColumnValue {
                    value: if column.is_null() {
                        None
                    } else {
                        Some(column.value.clone())
                    },
                    mysql_type: column.mysql_type.clone(),
                    is_key: column.is_key,
                    updated: column.updated,
                },
            )
        })
        .collect()
}
