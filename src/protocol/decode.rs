//! Rows result and value decoding

use super::constants::{result_kind, rows_flags, type_id};
use super::message::{ColumnSpec, RowsMetadata, RowsResult};
use super::types::{DataType, ProtocolVersion};
use super::value::Value;
use crate::{Error, Result};
use bytes::Bytes;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use uuid::Uuid;

/// Maximum nesting of collection, tuple and UDT types.
///
/// Type options are recursive; a crafted payload could otherwise nest
/// until the stack overflows.
const MAX_TYPE_DEPTH: usize = 32;

/// Cursor over a big-endian protocol buffer
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Decode(format!(
                "unexpected end of data reading {} ({} bytes needed, {} left)",
                what,
                len,
                self.remaining()
            )));
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn read_u16(&mut self, what: &str) -> Result<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_i32(&mut self, what: &str) -> Result<i32> {
        let b = self.take(4, what)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// `[string]`: `[short]` length followed by UTF-8 bytes
    fn read_string(&mut self, what: &str) -> Result<String> {
        let len = self.read_u16(what)? as usize;
        let raw = self.take(len, what)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| Error::Decode(format!("invalid UTF-8 in {}", what)))
    }

    /// `[bytes]`: `[int]` length, negative meaning null
    fn read_bytes(&mut self, what: &str) -> Result<Option<&'a [u8]>> {
        let len = self.read_i32(what)?;
        if len < 0 {
            return Ok(None);
        }
        self.take(len as usize, what).map(Some)
    }

    /// `[short bytes]`
    fn read_short_bytes(&mut self, what: &str) -> Result<&'a [u8]> {
        let len = self.read_u16(what)? as usize;
        self.take(len, what)
    }

    /// Collection size, `[short]` on v2 and `[int]` afterwards
    fn read_collection_size(&mut self, version: ProtocolVersion) -> Result<usize> {
        if version.uses_short_collection_sizes() {
            return Ok(self.read_u16("collection size")? as usize);
        }
        let size = self.read_i32("collection size")?;
        usize::try_from(size)
            .map_err(|_| Error::Decode(format!("negative collection size {}", size)))
    }

    /// Collection element, sized like the collection itself
    fn read_collection_element(&mut self, version: ProtocolVersion) -> Result<Option<&'a [u8]>> {
        if version.uses_short_collection_sizes() {
            return self.read_short_bytes("collection element").map(Some);
        }
        self.read_bytes("collection element")
    }

    /// Unsigned variable-length integer (leading one bits count extra bytes)
    fn read_unsigned_vint(&mut self, what: &str) -> Result<u64> {
        let first = self.read_u8(what)?;
        let extra = first.leading_ones() as usize;
        let mut value = if extra >= 8 {
            0
        } else {
            u64::from(first & (0xFF >> extra))
        };
        for _ in 0..extra {
            value = (value << 8) | u64::from(self.read_u8(what)?);
        }
        Ok(value)
    }

    fn read_vint(&mut self, what: &str) -> Result<i64> {
        let n = self.read_unsigned_vint(what)?;
        Ok(((n >> 1) as i64) ^ -((n & 1) as i64))
    }

    /// `[option]`: a type id followed by type parameters
    fn read_option(&mut self, depth: usize) -> Result<DataType> {
        if depth > MAX_TYPE_DEPTH {
            return Err(Error::Decode(format!(
                "type nesting exceeds maximum depth {}",
                MAX_TYPE_DEPTH
            )));
        }

        let id = self.read_u16("type id")?;
        if let Some(simple) = DataType::simple(id) {
            return Ok(simple);
        }

        let data_type = match id {
            type_id::CUSTOM => DataType::Custom(self.read_string("custom type class")?),
            type_id::LIST => DataType::List(Box::new(self.read_option(depth + 1)?)),
            type_id::SET => DataType::Set(Box::new(self.read_option(depth + 1)?)),
            type_id::MAP => {
                let key = self.read_option(depth + 1)?;
                let value = self.read_option(depth + 1)?;
                DataType::Map(Box::new(key), Box::new(value))
            }
            type_id::UDT => {
                let keyspace = self.read_string("udt keyspace")?;
                let name = self.read_string("udt name")?;
                let count = self.read_u16("udt field count")?;
                let mut fields = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let field_name = self.read_string("udt field name")?;
                    let field_type = self.read_option(depth + 1)?;
                    fields.push((field_name, field_type));
                }
                DataType::Udt {
                    keyspace,
                    name,
                    fields,
                }
            }
            type_id::TUPLE => {
                let count = self.read_u16("tuple element count")?;
                let mut elements = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    elements.push(self.read_option(depth + 1)?);
                }
                DataType::Tuple(elements)
            }
            other => {
                return Err(Error::Decode(format!("unknown type id 0x{:04X}", other)));
            }
        };
        Ok(data_type)
    }
}

/// Decode a `RESULT` message body of kind `Rows`
///
/// `body` starts at the result kind `[int]`; the frame header must already
/// be stripped. Cell values are copied out of `body` but not decoded; use
/// [`decode_value`] (or a [`RowSet`](crate::RowSet)) for that.
///
/// # Errors
///
/// Returns `Error::Decode` if the body is not a rows result, is truncated,
/// or carries trailing bytes.
pub fn decode_rows_result(body: &[u8], version: ProtocolVersion) -> Result<RowsResult> {
    let mut reader = Reader::new(body);

    let kind = reader.read_i32("result kind")?;
    if kind != result_kind::ROWS {
        return Err(Error::Decode(format!(
            "expected rows result (kind 0x{:04X}), got kind 0x{:04X}",
            result_kind::ROWS,
            kind
        )));
    }

    let metadata = decode_rows_metadata(&mut reader, version)?;

    let row_count = reader.read_i32("row count")?;
    let row_count = usize::try_from(row_count)
        .map_err(|_| Error::Decode(format!("negative row count {}", row_count)))?;

    if metadata.column_count == 0 {
        if row_count > 0 {
            return Err(Error::Decode(format!(
                "{} rows declared with no columns",
                row_count
            )));
        }
    } else {
        // Every cell needs at least its 4-byte length
        let max_rows = reader.remaining() / 4 / metadata.column_count;
        if row_count > max_rows {
            return Err(Error::Decode(format!(
                "{} rows of {} columns do not fit in {} remaining bytes",
                row_count,
                metadata.column_count,
                reader.remaining()
            )));
        }
    }
    let mut rows = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        let mut cells = Vec::with_capacity(metadata.column_count);
        for _ in 0..metadata.column_count {
            let cell = reader.read_bytes("cell")?.map(Bytes::copy_from_slice);
            cells.push(cell);
        }
        rows.push(cells);
    }

    if !reader.is_empty() {
        return Err(Error::Decode(format!(
            "{} trailing bytes after rows result",
            reader.remaining()
        )));
    }

    Ok(RowsResult { metadata, rows })
}

fn decode_rows_metadata(reader: &mut Reader<'_>, version: ProtocolVersion) -> Result<RowsMetadata> {
    let flags = reader.read_i32("metadata flags")?;
    let column_count = reader.read_i32("column count")?;
    let column_count = usize::try_from(column_count)
        .map_err(|_| Error::Decode(format!("negative column count {}", column_count)))?;

    let paging_state = if flags & rows_flags::HAS_MORE_PAGES != 0 {
        reader
            .read_bytes("paging state")?
            .map(Bytes::copy_from_slice)
    } else {
        None
    };

    let new_metadata_id =
        if version >= ProtocolVersion::V5 && flags & rows_flags::METADATA_CHANGED != 0 {
            Some(Bytes::copy_from_slice(
                reader.read_short_bytes("new metadata id")?,
            ))
        } else {
            None
        };

    let mut columns = Vec::new();
    if flags & rows_flags::NO_METADATA == 0 {
        let global = if flags & rows_flags::GLOBAL_TABLES_SPEC != 0 {
            let keyspace = reader.read_string("global keyspace")?;
            let table = reader.read_string("global table")?;
            Some((keyspace, table))
        } else {
            None
        };

        // Each spec is at least a 2-byte name length and a 2-byte type id.
        columns.reserve(column_count.min(reader.remaining() / 4));
        for _ in 0..column_count {
            let (keyspace, table) = match &global {
                Some((keyspace, table)) => (keyspace.clone(), table.clone()),
                None => (
                    reader.read_string("column keyspace")?,
                    reader.read_string("column table")?,
                ),
            };
            let name = reader.read_string("column name")?;
            let data_type = reader.read_option(0)?;
            columns.push(ColumnSpec {
                keyspace,
                table,
                name,
                data_type,
            });
        }
    }

    Ok(RowsMetadata {
        flags,
        column_count,
        paging_state,
        new_metadata_id,
        columns,
    })
}

/// Decode one cell against its declared type
///
/// `None` (a null cell) decodes to [`Value::Null`] for every type.
///
/// # Errors
///
/// Returns `Error::Decode` if the bytes do not match the type: wrong width
/// for fixed-size types, invalid text, truncated or over-long collections.
pub fn decode_value(
    data_type: &DataType,
    version: ProtocolVersion,
    cell: Option<&[u8]>,
) -> Result<Value> {
    match cell {
        None => Ok(Value::Null),
        Some(bytes) => decode_non_null(data_type, version, bytes),
    }
}

fn decode_non_null(data_type: &DataType, version: ProtocolVersion, bytes: &[u8]) -> Result<Value> {
    let value = match data_type {
        DataType::Custom(_) => Value::Custom(bytes.to_vec()),
        DataType::Ascii => {
            if !bytes.is_ascii() {
                return Err(Error::Decode("non-ASCII byte in ascii value".into()));
            }
            Value::Ascii(String::from_utf8_lossy(bytes).into_owned())
        }
        DataType::Varchar => Value::Text(
            String::from_utf8(bytes.to_vec())
                .map_err(|_| Error::Decode("invalid UTF-8 in text value".into()))?,
        ),
        DataType::BigInt => Value::BigInt(i64::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Counter => Value::Counter(i64::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Timestamp => Value::Timestamp(i64::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Time => Value::Time(i64::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Int => Value::Int(i32::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Date => Value::Date(u32::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::SmallInt => Value::SmallInt(i16::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::TinyInt => Value::TinyInt(i8::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Double => Value::Double(f64::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Float => Value::Float(f32::from_be_bytes(fixed(data_type, bytes)?)),
        DataType::Boolean => {
            let [b] = fixed::<1>(data_type, bytes)?;
            Value::Boolean(b != 0)
        }
        DataType::Blob => Value::Blob(bytes.to_vec()),
        DataType::Varint => {
            if bytes.is_empty() {
                return Err(Error::Decode("empty varint".into()));
            }
            Value::Varint(bytes.to_vec())
        }
        DataType::Decimal => {
            if bytes.len() < 5 {
                return Err(Error::Decode(format!(
                    "decimal needs at least 5 bytes, got {}",
                    bytes.len()
                )));
            }
            let scale = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            Value::Decimal {
                scale,
                unscaled: bytes[4..].to_vec(),
            }
        }
        DataType::Uuid => Value::Uuid(Uuid::from_bytes(fixed(data_type, bytes)?)),
        DataType::TimeUuid => Value::TimeUuid(Uuid::from_bytes(fixed(data_type, bytes)?)),
        DataType::Inet => match bytes.len() {
            4 => Value::Inet(IpAddr::V4(Ipv4Addr::new(
                bytes[0], bytes[1], bytes[2], bytes[3],
            ))),
            16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(bytes);
                Value::Inet(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            other => {
                return Err(Error::Decode(format!(
                    "inet must be 4 or 16 bytes, got {}",
                    other
                )))
            }
        },
        DataType::Duration => {
            let mut reader = Reader::new(bytes);
            let months = reader.read_vint("duration months")?;
            let days = reader.read_vint("duration days")?;
            let nanoseconds = reader.read_vint("duration nanoseconds")?;
            finish(&reader, data_type)?;
            Value::Duration {
                months: i32::try_from(months)
                    .map_err(|_| Error::Decode(format!("duration months {} overflow", months)))?,
                days: i32::try_from(days)
                    .map_err(|_| Error::Decode(format!("duration days {} overflow", days)))?,
                nanoseconds,
            }
        }
        DataType::List(element) | DataType::Set(element) => {
            let mut reader = Reader::new(bytes);
            let count = reader.read_collection_size(version)?;
            let mut values = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                let cell = reader.read_collection_element(version)?;
                values.push(decode_value(element, version, cell)?);
            }
            finish(&reader, data_type)?;
            if matches!(data_type, DataType::Set(_)) {
                Value::Set(values)
            } else {
                Value::List(values)
            }
        }
        DataType::Map(key_type, value_type) => {
            let mut reader = Reader::new(bytes);
            let count = reader.read_collection_size(version)?;
            let mut entries = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                let key = decode_value(key_type, version, reader.read_collection_element(version)?)?;
                let value =
                    decode_value(value_type, version, reader.read_collection_element(version)?)?;
                entries.push((key, value));
            }
            finish(&reader, data_type)?;
            Value::Map(entries)
        }
        DataType::Tuple(element_types) => {
            let mut reader = Reader::new(bytes);
            let mut values = Vec::with_capacity(element_types.len());
            for element_type in element_types {
                let cell = reader.read_bytes("tuple element")?;
                values.push(decode_value(element_type, version, cell)?);
            }
            finish(&reader, data_type)?;
            Value::Tuple(values)
        }
        DataType::Udt { fields, .. } => {
            let mut reader = Reader::new(bytes);
            let mut values = Vec::with_capacity(fields.len());
            for (name, field_type) in fields {
                // Values written before a field was added to the type end early.
                let value = if reader.is_empty() {
                    Value::Null
                } else {
                    decode_value(field_type, version, reader.read_bytes("udt field")?)?
                };
                values.push((name.clone(), value));
            }
            finish(&reader, data_type)?;
            Value::Udt(values)
        }
    };
    Ok(value)
}

/// Copy a fixed-width value, rejecting any other length
fn fixed<const N: usize>(data_type: &DataType, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| {
        Error::Decode(format!(
            "{} must be {} bytes, got {}",
            data_type,
            N,
            bytes.len()
        ))
    })
}

fn finish(reader: &Reader<'_>, data_type: &DataType) -> Result<()> {
    if reader.is_empty() {
        Ok(())
    } else {
        Err(Error::Decode(format!(
            "{} trailing bytes in {} value",
            reader.remaining(),
            data_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_v4(elements: &[&[u8]]) -> Vec<u8> {
        let mut buf = (elements.len() as i32).to_be_bytes().to_vec();
        for e in elements {
            buf.extend_from_slice(&(e.len() as i32).to_be_bytes());
            buf.extend_from_slice(e);
        }
        buf
    }

    #[test]
    fn test_decode_inet_v4_and_v6() {
        let v = decode_value(&DataType::Inet, ProtocolVersion::V4, Some(&[10, 0, 0, 5])).unwrap();
        assert_eq!(v, Value::Inet("10.0.0.5".parse().unwrap()));

        let v6: Ipv6Addr = "fe80::1".parse().unwrap();
        let v = decode_value(&DataType::Inet, ProtocolVersion::V4, Some(&v6.octets())).unwrap();
        assert_eq!(v, Value::Inet(IpAddr::V6(v6)));
    }

    #[test]
    fn test_decode_inet_bad_length() {
        let err = decode_value(&DataType::Inet, ProtocolVersion::V4, Some(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().contains("4 or 16"));
    }

    #[test]
    fn test_decode_null_cell() {
        let v = decode_value(&DataType::Uuid, ProtocolVersion::V4, None).unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_decode_fixed_width_rejects_wrong_length() {
        let err = decode_value(&DataType::Int, ProtocolVersion::V4, Some(&[0, 0, 1])).unwrap_err();
        assert_eq!(err.to_string(), "decode error: int must be 4 bytes, got 3");

        assert!(decode_value(&DataType::Uuid, ProtocolVersion::V4, Some(&[0; 15])).is_err());
    }

    #[test]
    fn test_decode_ascii_rejects_high_bytes() {
        assert!(decode_value(&DataType::Ascii, ProtocolVersion::V4, Some(&[0x61, 0xC3])).is_err());
    }

    #[test]
    fn test_decode_list_depends_on_version() {
        let element_type = DataType::List(Box::new(DataType::Int));

        // v4: [int] count, [int] lengths
        let v4 = list_v4(&[&7i32.to_be_bytes(), &9i32.to_be_bytes()]);
        let v = decode_value(&element_type, ProtocolVersion::V4, Some(&v4)).unwrap();
        assert_eq!(v, Value::List(vec![Value::Int(7), Value::Int(9)]));

        // v2: [short] count, [short] lengths
        let v2 = [0, 1, 0, 4, 0, 0, 0, 7];
        let v = decode_value(&element_type, ProtocolVersion::V2, Some(&v2)).unwrap();
        assert_eq!(v, Value::List(vec![Value::Int(7)]));

        // v4 bytes read as v2 are garbage and must fail, not misdecode silently
        assert!(decode_value(&element_type, ProtocolVersion::V2, Some(&v4)).is_err());
    }

    #[test]
    fn test_decode_list_null_element_v4() {
        let mut buf = 1i32.to_be_bytes().to_vec();
        buf.extend_from_slice(&(-1i32).to_be_bytes());
        let t = DataType::List(Box::new(DataType::Varchar));
        let v = decode_value(&t, ProtocolVersion::V4, Some(&buf)).unwrap();
        assert_eq!(v, Value::List(vec![Value::Null]));
    }

    #[test]
    fn test_decode_collection_trailing_bytes() {
        let mut buf = list_v4(&[&1i32.to_be_bytes()]);
        buf.push(0xFF);
        let t = DataType::Set(Box::new(DataType::Int));
        let err = decode_value(&t, ProtocolVersion::V4, Some(&buf)).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn test_decode_map() {
        let mut buf = 1i32.to_be_bytes().to_vec();
        buf.extend_from_slice(&3i32.to_be_bytes());
        buf.extend_from_slice(b"dc1");
        buf.extend_from_slice(&4i32.to_be_bytes());
        buf.extend_from_slice(&3i32.to_be_bytes());
        let t = DataType::Map(Box::new(DataType::Varchar), Box::new(DataType::Int));
        let v = decode_value(&t, ProtocolVersion::V4, Some(&buf)).unwrap();
        assert_eq!(v, Value::Map(vec![(Value::Text("dc1".into()), Value::Int(3))]));
    }

    #[test]
    fn test_decode_udt_with_missing_trailing_field() {
        let t = DataType::Udt {
            keyspace: "ks".into(),
            name: "address".into(),
            fields: vec![
                ("street".into(), DataType::Varchar),
                ("zip".into(), DataType::Int),
            ],
        };
        let mut buf = 4i32.to_be_bytes().to_vec();
        buf.extend_from_slice(b"main");
        let v = decode_value(&t, ProtocolVersion::V4, Some(&buf)).unwrap();
        assert_eq!(
            v,
            Value::Udt(vec![
                ("street".into(), Value::Text("main".into())),
                ("zip".into(), Value::Null),
            ])
        );
    }

    #[test]
    fn test_decode_duration_vints() {
        // months = 1 (zigzag 2), days = -1 (zigzag 1), nanos = 100 (zigzag 200 -> two bytes)
        let buf = [0x02, 0x01, 0x80, 0xC8];
        let v = decode_value(&DataType::Duration, ProtocolVersion::V5, Some(&buf)).unwrap();
        assert_eq!(
            v,
            Value::Duration {
                months: 1,
                days: -1,
                nanoseconds: 100
            }
        );
    }

    #[test]
    fn test_decode_rows_result_rejects_other_kinds() {
        let body = result_kind::VOID.to_be_bytes();
        let err = decode_rows_result(&body, ProtocolVersion::V4).unwrap_err();
        assert!(err.to_string().contains("expected rows result"));
    }

    #[test]
    fn test_decode_rows_result_no_metadata() {
        let mut body = result_kind::ROWS.to_be_bytes().to_vec();
        body.extend_from_slice(&rows_flags::NO_METADATA.to_be_bytes());
        body.extend_from_slice(&1i32.to_be_bytes()); // columns
        body.extend_from_slice(&1i32.to_be_bytes()); // rows
        body.extend_from_slice(&(-1i32).to_be_bytes()); // null cell

        let result = decode_rows_result(&body, ProtocolVersion::V4).unwrap();
        assert!(result.metadata.columns.is_empty());
        assert!(!result.metadata.has_column_specs());
        assert_eq!(result.rows, vec![vec![None]]);
    }

    #[test]
    fn test_decode_rows_result_truncated() {
        let mut body = result_kind::ROWS.to_be_bytes().to_vec();
        body.extend_from_slice(&rows_flags::GLOBAL_TABLES_SPEC.to_be_bytes());
        body.extend_from_slice(&1i32.to_be_bytes());
        body.extend_from_slice(&[0, 6]);
        body.extend_from_slice(b"sys");

        let err = decode_rows_result(&body, ProtocolVersion::V4).unwrap_err();
        assert!(err.to_string().contains("unexpected end of data"));
    }

    fn rows_header(column_count: i32, row_count: i32) -> Vec<u8> {
        let mut body = result_kind::ROWS.to_be_bytes().to_vec();
        body.extend_from_slice(&rows_flags::NO_METADATA.to_be_bytes());
        body.extend_from_slice(&column_count.to_be_bytes());
        body.extend_from_slice(&row_count.to_be_bytes());
        body
    }

    #[test]
    fn test_decode_rows_result_rows_without_columns() {
        let body = rows_header(0, i32::MAX);
        let err = decode_rows_result(&body, ProtocolVersion::V4).unwrap_err();
        assert!(matches!(err, Error::Decode(ref msg) if msg.contains("no columns")));

        let err = decode_rows_result(&rows_header(0, 1), ProtocolVersion::V4).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let result = decode_rows_result(&rows_header(0, 0), ProtocolVersion::V4).unwrap();
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_decode_rows_result_row_count_exceeds_body() {
        let mut body = rows_header(2, i32::MAX);
        body.extend_from_slice(&(-1i32).to_be_bytes());
        body.extend_from_slice(&(-1i32).to_be_bytes());

        let err = decode_rows_result(&body, ProtocolVersion::V4).unwrap_err();
        assert!(matches!(err, Error::Decode(ref msg) if msg.contains("do not fit")));
    }

    #[test]
    fn test_decode_rows_result_huge_column_count() {
        let body = rows_header(i32::MAX, 1);
        let err = decode_rows_result(&body, ProtocolVersion::V4).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_read_option_depth_limit() {
        // list<list<list<...>>> nested past the limit
        let mut buf = Vec::new();
        for _ in 0..=MAX_TYPE_DEPTH + 1 {
            buf.extend_from_slice(&type_id::LIST.to_be_bytes());
        }
        buf.extend_from_slice(&type_id::INT.to_be_bytes());
        let err = Reader::new(&buf).read_option(0).unwrap_err();
        assert!(err.to_string().contains("maximum depth"));
    }
}
