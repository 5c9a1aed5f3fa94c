//! Decoded column values

use std::net::IpAddr;
use uuid::Uuid;

/// A decoded CQL value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null cell
    Null,
    /// ASCII string
    Ascii(String),
    /// UTF-8 string
    Text(String),
    /// 64-bit integer
    BigInt(i64),
    /// Counter
    Counter(i64),
    /// Raw bytes
    Blob(Vec<u8>),
    /// Boolean
    Boolean(bool),
    /// Decimal as `unscaled * 10^-scale`
    Decimal {
        /// Decimal scale
        scale: i32,
        /// Big-endian two's complement unscaled value
        unscaled: Vec<u8>,
    },
    /// 64-bit float
    Double(f64),
    /// 32-bit float
    Float(f32),
    /// 32-bit integer
    Int(i32),
    /// Milliseconds since the epoch
    Timestamp(i64),
    /// UUID
    Uuid(Uuid),
    /// Version 1 UUID
    TimeUuid(Uuid),
    /// Big-endian two's complement integer
    Varint(Vec<u8>),
    /// IP address
    Inet(IpAddr),
    /// Days since the epoch, where 2^31 is the epoch
    Date(u32),
    /// Nanoseconds since midnight
    Time(i64),
    /// 16-bit integer
    SmallInt(i16),
    /// 8-bit integer
    TinyInt(i8),
    /// Duration
    Duration {
        /// Months
        months: i32,
        /// Days
        days: i32,
        /// Nanoseconds
        nanoseconds: i64,
    },
    /// List
    List(Vec<Value>),
    /// Set, in wire order
    Set(Vec<Value>),
    /// Map entries, in wire order
    Map(Vec<(Value, Value)>),
    /// Tuple elements
    Tuple(Vec<Value>),
    /// UDT fields by name; fields missing from the wire are `Null`
    Udt(Vec<(String, Value)>),
    /// Custom type payload
    Custom(Vec<u8>),
}

impl Value {
    /// Whether the cell was null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// IP address, if this is an `inet` value
    pub fn as_inet(&self) -> Option<IpAddr> {
        match self {
            Value::Inet(addr) => Some(*addr),
            _ => None,
        }
    }

    /// UUID, for both `uuid` and `timeuuid` values
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(id) | Value::TimeUuid(id) => Some(*id),
            _ => None,
        }
    }

    /// String slice, for `ascii` and `text` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Ascii(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::BigInt(v) | Value::Counter(v) | Value::Timestamp(v) | Value::Time(v) => {
                Some(*v)
            }
            Value::Int(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::TinyInt(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Short name of the value's kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Ascii(_) => "ascii",
            Value::Text(_) => "text",
            Value::BigInt(_) => "bigint",
            Value::Counter(_) => "counter",
            Value::Blob(_) => "blob",
            Value::Boolean(_) => "boolean",
            Value::Decimal { .. } => "decimal",
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::TimeUuid(_) => "timeuuid",
            Value::Varint(_) => "varint",
            Value::Inet(_) => "inet",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::SmallInt(_) => "smallint",
            Value::TinyInt(_) => "tinyint",
            Value::Duration { .. } => "duration",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Tuple(_) => "tuple",
            Value::Udt(_) => "udt",
            Value::Custom(_) => "custom",
        }
    }
}
