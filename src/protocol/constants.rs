//! CQL native protocol constants

/// Default native transport port
pub const DEFAULT_PORT: u16 = 9042;

/// Result kinds (first `[int]` of a RESULT body)
pub mod result_kind {
    /// Void result
    pub const VOID: i32 = 0x0001;

    /// Rows result
    pub const ROWS: i32 = 0x0002;

    /// USE keyspace result
    pub const SET_KEYSPACE: i32 = 0x0003;

    /// Prepared statement result
    pub const PREPARED: i32 = 0x0004;

    /// Schema change result
    pub const SCHEMA_CHANGE: i32 = 0x0005;
}

/// Rows metadata flags
pub mod rows_flags {
    /// Keyspace and table are given once for all columns
    pub const GLOBAL_TABLES_SPEC: i32 = 0x0001;

    /// A paging state follows the column count
    pub const HAS_MORE_PAGES: i32 = 0x0002;

    /// Column specs are omitted
    pub const NO_METADATA: i32 = 0x0004;

    /// A new result metadata id follows (protocol v5)
    pub const METADATA_CHANGED: i32 = 0x0008;
}

/// `[option]` type ids
pub mod type_id {
    /// Custom type (class name follows)
    pub const CUSTOM: u16 = 0x0000;
    /// ASCII string
    pub const ASCII: u16 = 0x0001;
    /// 64-bit signed integer
    pub const BIGINT: u16 = 0x0002;
    /// Arbitrary bytes
    pub const BLOB: u16 = 0x0003;
    /// Boolean
    pub const BOOLEAN: u16 = 0x0004;
    /// Counter (64-bit)
    pub const COUNTER: u16 = 0x0005;
    /// Arbitrary-precision decimal
    pub const DECIMAL: u16 = 0x0006;
    /// 64-bit float
    pub const DOUBLE: u16 = 0x0007;
    /// 32-bit float
    pub const FLOAT: u16 = 0x0008;
    /// 32-bit signed integer
    pub const INT: u16 = 0x0009;
    /// Legacy text id (protocol v1/v2), same encoding as varchar
    pub const TEXT: u16 = 0x000A;
    /// Milliseconds since the epoch
    pub const TIMESTAMP: u16 = 0x000B;
    /// UUID
    pub const UUID: u16 = 0x000C;
    /// UTF-8 string
    pub const VARCHAR: u16 = 0x000D;
    /// Arbitrary-precision integer
    pub const VARINT: u16 = 0x000E;
    /// Version 1 UUID
    pub const TIMEUUID: u16 = 0x000F;
    /// IPv4 or IPv6 address
    pub const INET: u16 = 0x0010;
    /// Days since the epoch, centered at 2^31
    pub const DATE: u16 = 0x0011;
    /// Nanoseconds since midnight
    pub const TIME: u16 = 0x0012;
    /// 16-bit signed integer
    pub const SMALLINT: u16 = 0x0013;
    /// 8-bit signed integer
    pub const TINYINT: u16 = 0x0014;
    /// Months, days and nanoseconds
    pub const DURATION: u16 = 0x0015;
    /// List collection
    pub const LIST: u16 = 0x0020;
    /// Map collection
    pub const MAP: u16 = 0x0021;
    /// Set collection
    pub const SET: u16 = 0x0022;
    /// User-defined type
    pub const UDT: u16 = 0x0030;
    /// Tuple
    pub const TUPLE: u16 = 0x0031;
}

/// Topology columns of `system.local` / `system.peers`
pub mod columns {
    /// Address clients should use to reach the node
    pub const RPC_ADDRESS: &str = "rpc_address";

    /// Address of the node as seen by the queried node
    pub const PEER: &str = "peer";

    /// Cluster-unique node identifier
    pub const HOST_ID: &str = "host_id";
}
