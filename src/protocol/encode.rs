//! Rows result encoding
//!
//! The proxy answers some system-table queries itself (for example to
//! advertise its own address in `system.local`), so it needs to write rows
//! results as well as read them.

use super::constants::{result_kind, rows_flags};
use super::message::RowsResult;
use super::types::{DataType, ProtocolVersion};
use super::value::Value;
use crate::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::net::IpAddr;

/// Encode a rows result into a `RESULT` message body
///
/// Column specs are always written per column; `NO_METADATA` and
/// `GLOBAL_TABLES_SPEC` are never set.
///
/// # Errors
///
/// Returns `Error::Encode` if a row has the wrong number of cells or a
/// string does not fit in a `[short]` length.
pub fn encode_rows_result(result: &RowsResult) -> Result<BytesMut> {
    let metadata = &result.metadata;
    let mut buf = BytesMut::new();
    buf.put_i32(result_kind::ROWS);

    let mut flags = 0;
    if metadata.paging_state.is_some() {
        flags |= rows_flags::HAS_MORE_PAGES;
    }
    buf.put_i32(flags);
    buf.put_i32(len_i32(metadata.columns.len())?);

    if let Some(paging_state) = &metadata.paging_state {
        put_bytes(&mut buf, Some(paging_state.as_ref()))?;
    }

    for column in &metadata.columns {
        put_string(&mut buf, &column.keyspace)?;
        put_string(&mut buf, &column.table)?;
        put_string(&mut buf, &column.name)?;
        put_option(&mut buf, &column.data_type)?;
    }

    buf.put_i32(len_i32(result.rows.len())?);
    for (i, row) in result.rows.iter().enumerate() {
        if row.len() != metadata.columns.len() {
            return Err(Error::Encode(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                metadata.columns.len()
            )));
        }
        for cell in row {
            put_bytes(&mut buf, cell.as_deref())?;
        }
    }

    Ok(buf)
}

/// Encode a single value as cell bytes (`None` for null)
///
/// # Errors
///
/// Returns `Error::Encode` if the value cannot be represented, such as a
/// v2 collection with more than 65535 elements.
pub fn encode_value(value: &Value, version: ProtocolVersion) -> Result<Option<Bytes>> {
    let mut buf = BytesMut::new();
    match value {
        Value::Null => return Ok(None),
        Value::Ascii(s) | Value::Text(s) => buf.put_slice(s.as_bytes()),
        Value::BigInt(v) | Value::Counter(v) | Value::Timestamp(v) | Value::Time(v) => {
            buf.put_i64(*v)
        }
        Value::Blob(b) | Value::Varint(b) | Value::Custom(b) => buf.put_slice(b),
        Value::Boolean(b) => buf.put_u8(u8::from(*b)),
        Value::Decimal { scale, unscaled } => {
            buf.put_i32(*scale);
            buf.put_slice(unscaled);
        }
        Value::Double(v) => buf.put_f64(*v),
        Value::Float(v) => buf.put_f32(*v),
        Value::Int(v) => buf.put_i32(*v),
        Value::Uuid(id) | Value::TimeUuid(id) => buf.put_slice(id.as_bytes()),
        Value::Inet(IpAddr::V4(addr)) => buf.put_slice(&addr.octets()),
        Value::Inet(IpAddr::V6(addr)) => buf.put_slice(&addr.octets()),
        Value::Date(v) => buf.put_u32(*v),
        Value::SmallInt(v) => buf.put_i16(*v),
        Value::TinyInt(v) => buf.put_i8(*v),
        Value::Duration {
            months,
            days,
            nanoseconds,
        } => {
            put_vint(&mut buf, i64::from(*months));
            put_vint(&mut buf, i64::from(*days));
            put_vint(&mut buf, *nanoseconds);
        }
        Value::List(values) | Value::Set(values) => {
            put_collection_size(&mut buf, values.len(), version)?;
            for v in values {
                put_collection_element(&mut buf, encode_value(v, version)?, version)?;
            }
        }
        Value::Map(entries) => {
            put_collection_size(&mut buf, entries.len(), version)?;
            for (k, v) in entries {
                put_collection_element(&mut buf, encode_value(k, version)?, version)?;
                put_collection_element(&mut buf, encode_value(v, version)?, version)?;
            }
        }
        Value::Tuple(values) => {
            for v in values {
                put_bytes(&mut buf, encode_value(v, version)?.as_deref())?;
            }
        }
        Value::Udt(fields) => {
            for (_, v) in fields {
                put_bytes(&mut buf, encode_value(v, version)?.as_deref())?;
            }
        }
    }
    Ok(Some(buf.freeze()))
}

fn len_i32(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::Encode(format!("length {} exceeds [int]", len)))
}

fn len_u16(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::Encode(format!("length {} exceeds [short]", len)))
}

fn put_string(buf: &mut BytesMut, s: &str) -> Result<()> {
    buf.put_u16(len_u16(s.len())?);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn put_bytes(buf: &mut BytesMut, bytes: Option<&[u8]>) -> Result<()> {
    match bytes {
        Some(b) => {
            buf.put_i32(len_i32(b.len())?);
            buf.put_slice(b);
        }
        None => buf.put_i32(-1),
    }
    Ok(())
}

fn put_collection_size(buf: &mut BytesMut, len: usize, version: ProtocolVersion) -> Result<()> {
    if version.uses_short_collection_sizes() {
        buf.put_u16(len_u16(len)?);
    } else {
        buf.put_i32(len_i32(len)?);
    }
    Ok(())
}

fn put_collection_element(
    buf: &mut BytesMut,
    element: Option<Bytes>,
    version: ProtocolVersion,
) -> Result<()> {
    if !version.uses_short_collection_sizes() {
        return put_bytes(buf, element.as_deref());
    }
    let element = element
        .ok_or_else(|| Error::Encode("null collection element needs protocol v3+".into()))?;
    buf.put_u16(len_u16(element.len())?);
    buf.put_slice(&element);
    Ok(())
}

fn put_option(buf: &mut BytesMut, data_type: &DataType) -> Result<()> {
    buf.put_u16(data_type.type_id());
    match data_type {
        DataType::Custom(class) => put_string(buf, class)?,
        DataType::List(element) | DataType::Set(element) => put_option(buf, element)?,
        DataType::Map(key, value) => {
            put_option(buf, key)?;
            put_option(buf, value)?;
        }
        DataType::Udt {
            keyspace,
            name,
            fields,
        } => {
            put_string(buf, keyspace)?;
            put_string(buf, name)?;
            buf.put_u16(len_u16(fields.len())?);
            for (field_name, field_type) in fields {
                put_string(buf, field_name)?;
                put_option(buf, field_type)?;
            }
        }
        DataType::Tuple(elements) => {
            buf.put_u16(len_u16(elements.len())?);
            for element in elements {
                put_option(buf, element)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Zig-zag encode, then write as an unsigned vint
fn put_vint(buf: &mut BytesMut, value: i64) {
    let n = ((value << 1) ^ (value >> 63)) as u64;
    let significant_bits = 64 - n.leading_zeros() as usize;
    // The first byte holds 7 value bits; each extra byte adds 7 net bits.
    let extra = significant_bits.saturating_sub(1) / 7;

    if extra >= 8 {
        buf.put_u8(0xFF);
        buf.put_u64(n);
        return;
    }

    let marker = !(0xFFu8 >> extra);
    buf.put_u8(((n >> (8 * extra)) as u8) | marker);
    buf.put_slice(&n.to_be_bytes()[8 - extra..]);
}
