//! CQL native protocol: rows results, column types and values
//!
//! Only the `RESULT`/`Rows` body is handled here; frame headers,
//! compression and stream ids belong to the frame codec.

pub mod constants;
pub mod decode;
pub mod encode;
pub mod message;
pub mod types;
pub mod value;

pub use constants::DEFAULT_PORT;
pub use decode::{decode_rows_result, decode_value};
pub use encode::{encode_rows_result, encode_value};
pub use message::{ColumnSpec, RowsMetadata, RowsResult};
pub use types::{DataType, ProtocolVersion};
pub use value::Value;
