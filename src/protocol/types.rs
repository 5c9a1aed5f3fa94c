//! Column data types and protocol versions

use super::constants::type_id;
use crate::{Error, Result};

/// Native protocol version in effect on a connection
///
/// Only affects value decoding: v2 sizes collections with `[short]`,
/// later versions with `[int]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    /// Protocol v2
    V2,
    /// Protocol v3
    V3,
    /// Protocol v4
    V4,
    /// Protocol v5
    V5,
}

impl ProtocolVersion {
    /// Whether collection sizes and element lengths are `[short]`
    pub fn uses_short_collection_sizes(&self) -> bool {
        matches!(self, Self::V2)
    }

    /// Numeric version as sent in the frame header
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
            Self::V5 => 5,
        }
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = Error;

    fn try_from(version: u8) -> Result<Self> {
        // The high bit marks response frames; ignore it.
        match version & 0x7F {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            4 => Ok(Self::V4),
            5 => Ok(Self::V5),
            other => Err(Error::Decode(format!(
                "unsupported protocol version {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.as_u8())
    }
}

/// Declared type of a column, decoded from an `[option]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// Server-side custom type, identified by its Java class name
    Custom(String),
    /// ASCII string
    Ascii,
    /// 64-bit signed integer
    BigInt,
    /// Arbitrary bytes
    Blob,
    /// Boolean
    Boolean,
    /// Counter
    Counter,
    /// Arbitrary-precision decimal
    Decimal,
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// 32-bit signed integer
    Int,
    /// Milliseconds since the epoch
    Timestamp,
    /// UUID
    Uuid,
    /// UTF-8 string (`text` and `varchar`)
    Varchar,
    /// Arbitrary-precision integer
    Varint,
    /// Version 1 UUID
    TimeUuid,
    /// IP address
    Inet,
    /// Date without time
    Date,
    /// Time of day
    Time,
    /// 16-bit signed integer
    SmallInt,
    /// 8-bit signed integer
    TinyInt,
    /// Duration
    Duration,
    /// `list<T>`
    List(Box<DataType>),
    /// `map<K, V>`
    Map(Box<DataType>, Box<DataType>),
    /// `set<T>`
    Set(Box<DataType>),
    /// User-defined type
    Udt {
        /// Keyspace the type lives in
        keyspace: String,
        /// Type name
        name: String,
        /// Field names and types, in declaration order
        fields: Vec<(String, DataType)>,
    },
    /// `tuple<...>`
    Tuple(Vec<DataType>),
}

impl DataType {
    /// The `[option]` id for this type
    pub fn type_id(&self) -> u16 {
        match self {
            Self::Custom(_) => type_id::CUSTOM,
            Self::Ascii => type_id::ASCII,
            Self::BigInt => type_id::BIGINT,
            Self::Blob => type_id::BLOB,
            Self::Boolean => type_id::BOOLEAN,
            Self::Counter => type_id::COUNTER,
            Self::Decimal => type_id::DECIMAL,
            Self::Double => type_id::DOUBLE,
            Self::Float => type_id::FLOAT,
            Self::Int => type_id::INT,
            Self::Timestamp => type_id::TIMESTAMP,
            Self::Uuid => type_id::UUID,
            Self::Varchar => type_id::VARCHAR,
            Self::Varint => type_id::VARINT,
            Self::TimeUuid => type_id::TIMEUUID,
            Self::Inet => type_id::INET,
            Self::Date => type_id::DATE,
            Self::Time => type_id::TIME,
            Self::SmallInt => type_id::SMALLINT,
            Self::TinyInt => type_id::TINYINT,
            Self::Duration => type_id::DURATION,
            Self::List(_) => type_id::LIST,
            Self::Map(_, _) => type_id::MAP,
            Self::Set(_) => type_id::SET,
            Self::Udt { .. } => type_id::UDT,
            Self::Tuple(_) => type_id::TUPLE,
        }
    }

    /// Map a simple (non-parameterized) type id to its type
    pub(crate) fn simple(id: u16) -> Option<Self> {
        let data_type = match id {
            type_id::ASCII => Self::Ascii,
            type_id::BIGINT => Self::BigInt,
            type_id::BLOB => Self::Blob,
            type_id::BOOLEAN => Self::Boolean,
            type_id::COUNTER => Self::Counter,
            type_id::DECIMAL => Self::Decimal,
            type_id::DOUBLE => Self::Double,
            type_id::FLOAT => Self::Float,
            type_id::INT => Self::Int,
            type_id::TEXT | type_id::VARCHAR => Self::Varchar,
            type_id::TIMESTAMP => Self::Timestamp,
            type_id::UUID => Self::Uuid,
            type_id::VARINT => Self::Varint,
            type_id::TIMEUUID => Self::TimeUuid,
            type_id::INET => Self::Inet,
            type_id::DATE => Self::Date,
            type_id::TIME => Self::Time,
            type_id::SMALLINT => Self::SmallInt,
            type_id::TINYINT => Self::TinyInt,
            type_id::DURATION => Self::Duration,
            _ => return None,
        };
        Some(data_type)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(class) => write!(f, "'{}'", class),
            Self::Ascii => write!(f, "ascii"),
            Self::BigInt => write!(f, "bigint"),
            Self::Blob => write!(f, "blob"),
            Self::Boolean => write!(f, "boolean"),
            Self::Counter => write!(f, "counter"),
            Self::Decimal => write!(f, "decimal"),
            Self::Double => write!(f, "double"),
            Self::Float => write!(f, "float"),
            Self::Int => write!(f, "int"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Uuid => write!(f, "uuid"),
            Self::Varchar => write!(f, "varchar"),
            Self::Varint => write!(f, "varint"),
            Self::TimeUuid => write!(f, "timeuuid"),
            Self::Inet => write!(f, "inet"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::SmallInt => write!(f, "smallint"),
            Self::TinyInt => write!(f, "tinyint"),
            Self::Duration => write!(f, "duration"),
            Self::List(element) => write!(f, "list<{}>", element),
            Self::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            Self::Set(element) => write!(f, "set<{}>", element),
            Self::Udt { keyspace, name, .. } => write!(f, "{}.{}", keyspace, name),
            Self::Tuple(elements) => {
                write!(f, "tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ">")
            }
        }
    }
}
