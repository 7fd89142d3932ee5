//! Canal wire schema.
//!
//! Manually defined prost messages matching the canal server's protobuf
//! schema (CanalPacket and EntryProtocol). Two layers: `Packet` and the
//! request/response bodies it carries, and the `Entry` records nested as
//! opaque bytes inside a pulled `Messages` batch.
//!
//! Presence matters for the defaulted fields: an unset `error_code`
//! decodes to 0 through its accessor but stays distinguishable from an
//! explicit 0, and unknown field numbers from newer servers are skipped
//! on decode.

/// Sentinel batch id for a pull that found no pending data. A batch with
/// this id must never be acknowledged.
pub const EMPTY_BATCH_ID: i64 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Compression {
    /// Reserved proto2 compatibility value.
    CompatibleProto2 = 0,
    None = 1,
    Zlib = 2,
    Gzip = 3,
    Lzf = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PacketType {
    /// Reserved proto2 compatibility value.
    CompatibleProto2 = 0,
    Handshake = 1,
    ClientAuthentication = 2,
    Ack = 3,
    Subscription = 4,
    Unsubscription = 5,
    Get = 6,
    Messages = 7,
    ClientAck = 8,
    Shutdown = 9,
    Dump = 10,
    Heartbeat = 11,
    ClientRollback = 12,
}

/// Envelope for every frame payload on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Packet {
    #[prost(int32, optional, tag = "1", default = "17")]
    pub magic_number: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "2", default = "1")]
    pub version: ::core::option::Option<i32>,
    #[prost(enumeration = "PacketType", tag = "3")]
    pub r#type: i32,
    /// This client only ever negotiates NONE.
    #[prost(enumeration = "Compression", optional, tag = "4", default = "None")]
    pub compression: ::core::option::Option<i32>,
    /// Encoded body; its schema depends on `type`.
    #[prost(bytes = "vec", tag = "5")]
    pub body: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeartBeat {
    #[prost(int64, tag = "1")]
    pub send_timestamp: i64,
    #[prost(int64, tag = "2")]
    pub start_timestamp: i64,
}

/// First packet the server sends on a fresh connection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Handshake {
    #[prost(string, optional, tag = "1", default = "utf8")]
    pub communication_encoding: ::core::option::Option<::prost::alloc::string::String>,
    /// Salt for the password scramble when the server runs with
    /// credentials enabled.
    #[prost(bytes = "vec", tag = "2")]
    pub seeds: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "Compression", tag = "3")]
    pub supported_compressions: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientAuth {
    #[prost(string, tag = "1")]
    pub username: ::prost::alloc::string::String,
    /// Scrambled with the handshake seeds, never the clear password.
    #[prost(bytes = "vec", tag = "2")]
    pub password: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, optional, tag = "3", default = "0")]
    pub net_read_timeout: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "4", default = "0")]
    pub net_write_timeout: ::core::option::Option<i32>,
    #[prost(string, tag = "5")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub filter: ::prost::alloc::string::String,
    #[prost(int64, tag = "8")]
    pub start_timestamp: i64,
}

/// Universal "did my last request succeed" response body.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ack {
    /// 0 means success; unset also reads as 0 through the accessor.
    #[prost(int32, optional, tag = "1", default = "0")]
    pub error_code: ::core::option::Option<i32>,
    #[prost(string, tag = "2")]
    pub error_message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientAck {
    #[prost(string, tag = "1")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub batch_id: i64,
}

/// Subscription request body. The filter is a server-side table filter
/// expression; empty behaves as "all tables".
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Sub {
    #[prost(string, tag = "1")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub filter: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unsub {
    #[prost(string, tag = "1")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub filter: ::prost::alloc::string::String,
}

/// Pull request body.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Get {
    #[prost(string, tag = "1")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub fetch_size: i32,
    /// -1 disables server-side timeout control.
    #[prost(int64, optional, tag = "4", default = "-1")]
    pub timeout: ::core::option::Option<i64>,
    /// Time unit for `timeout`: 0 ns, 1 ms, 2 us, 3 s, 4 min, 5 h, 6 d.
    #[prost(int32, optional, tag = "5", default = "2")]
    pub unit: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "6", default = "false")]
    pub auto_ack: ::core::option::Option<bool>,
}

/// Pull response body. Each element of `messages` is an encoded `Entry`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Messages {
    #[prost(int64, tag = "1")]
    pub batch_id: i64,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub messages: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

impl Messages {
    /// True for the "no data currently available" response.
    pub fn is_empty(&self) -> bool {
        self.batch_id == EMPTY_BATCH_ID || self.messages.is_empty()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Dump {
    #[prost(string, tag = "1")]
    pub journal: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub position: i64,
    #[prost(int64, optional, tag = "3", default = "0")]
    pub timestamp: ::core::option::Option<i64>,
}

/// Asks the server to redeliver a batch (batch_id 0 rolls back all
/// unacknowledged delivery state for the client).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientRollback {
    #[prost(string, tag = "1")]
    pub destination: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub client_id: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub batch_id: i64,
}

/// Upstream database flavor recorded in an entry header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DatabaseType {
    /// Reserved proto2 compatibility value.
    CompatibleProto2 = 0,
    Oracle = 1,
    Mysql = 2,
    Pgsql = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EntryType {
    /// Reserved proto2 compatibility value.
    CompatibleProto2 = 0,
    TransactionBegin = 1,
    RowData = 2,
    TransactionEnd = 3,
    /// Server-internal liveness marker, no payload to decode.
    Heartbeat = 4,
    GtidLog = 5,
}

/// Change operation recorded on a header or row change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    /// Reserved proto2 compatibility value.
    CompatibleProto2 = 0,
    Insert = 1,
    Update = 2,
    Delete = 3,
    Create = 4,
    Alter = 5,
    Erase = 6,
    Query = 7,
    Truncate = 8,
    Rename = 9,
    /// CREATE INDEX
    CIndex = 10,
    DIndex = 11,
    Gtid = 12,
    XaCommit = 13,
    XaRollback = 14,
    MHeartbeat = 15,
}

/// Reserved key/value extension slot.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pair {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

/// Provenance of one change event.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    #[prost(int32, optional, tag = "1", default = "1")]
    pub version: ::core::option::Option<i32>,
    /// Binlog/redolog file name.
    #[prost(string, tag = "2")]
    pub logfile_name: ::prost::alloc::string::String,
    /// Offset within that file.
    #[prost(int64, tag = "3")]
    pub logfile_offset: i64,
    #[prost(int64, tag = "4")]
    pub server_id: i64,
    /// Charset of the changed data.
    #[prost(string, tag = "5")]
    pub server_encode: ::prost::alloc::string::String,
    /// Execution time of the change, epoch milliseconds.
    #[prost(int64, tag = "6")]
    pub execute_time: i64,
    #[prost(enumeration = "DatabaseType", optional, tag = "7", default = "Mysql")]
    pub source_type: ::core::option::Option<i32>,
    #[prost(string, tag = "8")]
    pub schema_name: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub table_name: ::prost::alloc::string::String,
    #[prost(int64, tag = "10")]
    pub event_length: i64,
    #[prost(enumeration = "EventType", optional, tag = "11", default = "Update")]
    pub event_type: ::core::option::Option<i32>,
    #[prost(message, repeated, tag = "12")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
    /// GTID of the owning transaction.
    #[prost(string, tag = "13")]
    pub gtid: ::prost::alloc::string::String,
}

/// One change-log record. `store_value`'s schema is selected by
/// `entry_type`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entry {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<Header>,
    #[prost(enumeration = "EntryType", optional, tag = "2", default = "RowData")]
    pub entry_type: ::core::option::Option<i32>,
    #[prost(bytes = "vec", tag = "3")]
    pub store_value: ::prost::alloc::vec::Vec<u8>,
}

/// One column of a changed row. `value` is textual even for numeric and
/// temporal types.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Column {
    #[prost(int32, tag = "1")]
    pub index: i32,
    /// java.sql.Types code.
    #[prost(int32, tag = "2")]
    pub sql_type: i32,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(bool, tag = "4")]
    pub is_key: bool,
    /// For UPDATE events, whether this column's value changed.
    #[prost(bool, tag = "5")]
    pub updated: bool,
    #[prost(bool, optional, tag = "6", default = "false")]
    pub is_null: ::core::option::Option<bool>,
    #[prost(message, repeated, tag = "7")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
    #[prost(string, tag = "8")]
    pub value: ::prost::alloc::string::String,
    #[prost(int32, tag = "9")]
    pub length: i32,
    #[prost(string, tag = "10")]
    pub mysql_type: ::prost::alloc::string::String,
}

/// Before/after images of one changed row. `before_columns` is empty for
/// INSERT, `after_columns` is empty for DELETE, both are populated for
/// UPDATE.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowData {
    #[prost(message, repeated, tag = "1")]
    pub before_columns: ::prost::alloc::vec::Vec<Column>,
    #[prost(message, repeated, tag = "2")]
    pub after_columns: ::prost::alloc::vec::Vec<Column>,
    #[prost(message, repeated, tag = "3")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
}

/// Store value of a ROWDATA entry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowChange {
    #[prost(int64, tag = "1")]
    pub table_id: i64,
    #[prost(enumeration = "EventType", optional, tag = "2", default = "Update")]
    pub event_type: ::core::option::Option<i32>,
    #[prost(bool, optional, tag = "10", default = "false")]
    pub is_ddl: ::core::option::Option<bool>,
    /// DDL/query statement text.
    #[prost(string, tag = "11")]
    pub sql: ::prost::alloc::string::String,
    /// One database change can touch several rows.
    #[prost(message, repeated, tag = "12")]
    pub row_datas: ::prost::alloc::vec::Vec<RowData>,
    #[prost(message, repeated, tag = "13")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
    /// Schema the DDL executed in; kept because DDL can cross schemas.
    #[prost(string, optional, tag = "14")]
    pub ddl_schema_name: ::core::option::Option<::prost::alloc::string::String>,
}

/// Store value of a TRANSACTIONBEGIN entry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionBegin {
    /// Deprecated upstream, use the header's execute_time.
    #[prost(int64, tag = "1")]
    pub execute_time: i64,
    /// Deprecated upstream, begin entries carry no transaction id.
    #[prost(string, tag = "2")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
    #[prost(int64, tag = "4")]
    pub thread_id: i64,
}

/// Store value of a TRANSACTIONEND entry.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionEnd {
    /// Deprecated upstream, use the header's execute_time.
    #[prost(int64, tag = "1")]
    pub execute_time: i64,
    #[prost(string, tag = "2")]
    pub transaction_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub props: ::prost::alloc::vec::Vec<Pair>,
}
