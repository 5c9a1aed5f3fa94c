//! Rows result message types

use super::types::DataType;
use bytes::Bytes;

/// A decoded `RESULT` body of kind `Rows`
#[derive(Debug, Clone, Default)]
pub struct RowsResult {
    /// Result metadata
    pub metadata: RowsMetadata,
    /// Raw cell values, one `Vec` per row (`None` = null)
    pub rows: Vec<Vec<Option<Bytes>>>,
}

/// Rows result metadata
#[derive(Debug, Clone, Default)]
pub struct RowsMetadata {
    /// Raw metadata flags
    pub flags: i32,
    /// Number of columns in each row
    pub column_count: usize,
    /// Paging state, when more pages are available
    pub paging_state: Option<Bytes>,
    /// New result metadata id (protocol v5)
    pub new_metadata_id: Option<Bytes>,
    /// Column specs; empty when the server sent `NO_METADATA`
    pub columns: Vec<ColumnSpec>,
}

impl RowsMetadata {
    /// Whether column specs are present (not `NO_METADATA`)
    pub fn has_column_specs(&self) -> bool {
        self.column_count == 0 || !self.columns.is_empty()
    }
}

/// Column spec (name and declared type)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Keyspace of the column's table
    pub keyspace: String,
    /// Table the column belongs to
    pub table: String,
    /// Column name
    pub name: String,
    /// Declared data type
    pub data_type: DataType,
}

impl ColumnSpec {
    /// Create a column spec
    pub fn new(
        keyspace: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            table: table.into(),
            name: name.into(),
            data_type,
        }
    }
}
