//! Typed access to rows results
//!
//! A [`RowSet`] wraps one decoded rows result together with the protocol
//! version it arrived on. [`Row`]s borrow the set and decode cells lazily,
//! by position or by column name.

mod row_set;

pub use row_set::{Row, RowSet, Rows};
