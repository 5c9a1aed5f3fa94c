//! Row set and row views

use crate::protocol::{decode_value, ColumnSpec, ProtocolVersion, RowsResult, Value};
use crate::{Error, Result};
use std::collections::HashMap;

/// A decoded rows result with a column name index
#[derive(Debug, Clone)]
pub struct RowSet {
    result: RowsResult,
    version: ProtocolVersion,
    column_indexes: HashMap<String, usize>,
}

impl RowSet {
    /// Wrap a rows result, indexing its columns by name
    ///
    /// If a name appears more than once, the first column with that name is
    /// the one `by_name` returns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` if the result has no column specs
    /// (`NO_METADATA`) or a row's cell count differs from the column count.
    pub fn new(result: RowsResult, version: ProtocolVersion) -> Result<Self> {
        let columns = &result.metadata.columns;
        if !result.metadata.has_column_specs() {
            return Err(Error::Decode(
                "rows result carries no column metadata".into(),
            ));
        }

        if let Some((i, row)) = result
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::Decode(format!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }

        let mut column_indexes = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column_indexes.contains_key(&column.name) {
                tracing::debug!(column = %column.name, position = i, "ignoring duplicate column name");
                continue;
            }
            column_indexes.insert(column.name.clone(), i);
        }

        Ok(Self {
            result,
            version,
            column_indexes,
        })
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.result.rows.len()
    }

    /// Whether the result has no rows
    pub fn is_empty(&self) -> bool {
        self.result.rows.is_empty()
    }

    /// View of row `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= row_count()`. Use [`get`](Self::get) when the index
    /// is not known to be in range.
    pub fn row(&self, i: usize) -> Row<'_> {
        assert!(
            i < self.row_count(),
            "row index {} out of range ({} rows)",
            i,
            self.row_count()
        );
        Row {
            row_set: self,
            index: i,
        }
    }

    /// View of row `i`, or `None` if out of range
    pub fn get(&self, i: usize) -> Option<Row<'_>> {
        (i < self.row_count()).then(|| Row {
            row_set: self,
            index: i,
        })
    }

    /// Iterate over all rows
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            row_set: self,
            next: 0,
        }
    }

    /// Column specs, in position order
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.result.metadata.columns
    }

    /// Position of the column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_indexes.get(name).copied()
    }

    /// Protocol version values are decoded with
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Paging state, if the server has more pages
    pub fn paging_state(&self) -> Option<&[u8]> {
        self.result.metadata.paging_state.as_deref()
    }
}

/// Iterator over the rows of a [`RowSet`]
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    row_set: &'a RowSet,
    next: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.row_set.get(self.next)?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.row_set.row_count() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rows<'_> {}

/// A borrowed view of one row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    row_set: &'a RowSet,
    index: usize,
}

impl<'a> Row<'a> {
    /// Decode the value at column position `i`
    ///
    /// # Errors
    ///
    /// * `Error::ColumnIndexOutOfBounds` if `i` is not a column position
    /// * `Error::Decode` if the cell bytes are invalid for the column type
    pub fn by_position(&self, i: usize) -> Result<Value> {
        let columns = self.row_set.columns();
        let column = columns.get(i).ok_or(Error::ColumnIndexOutOfBounds {
            index: i,
            count: columns.len(),
        })?;
        let cell = self.row_set.result.rows[self.index][i].as_deref();
        decode_value(&column.data_type, self.row_set.version, cell).map_err(|e| match e {
            Error::Decode(msg) => Error::Decode(format!("column '{}': {}", column.name, msg)),
            other => other,
        })
    }

    /// Decode the value of the column called `name`
    ///
    /// # Errors
    ///
    /// * `Error::ColumnNotFound` if the result has no such column
    /// * `Error::Decode` if the cell bytes are invalid for the column type
    pub fn by_name(&self, name: &str) -> Result<Value> {
        let i = self
            .row_set
            .column_index(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        self.by_position(i)
    }

    /// Position of this row in its set
    pub fn index(&self) -> usize {
        self.index
    }

    /// The set this row belongs to
    pub fn row_set(&self) -> &'a RowSet {
        self.row_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_value, DataType, RowsMetadata};
    use bytes::Bytes;
    use uuid::Uuid;

    const V4: ProtocolVersion = ProtocolVersion::V4;

    fn cell(value: Value) -> Option<Bytes> {
        encode_value(&value, V4).unwrap()
    }

    fn peers_result() -> RowsResult {
        let columns = vec![
            ColumnSpec::new("system", "peers", "peer", DataType::Inet),
            ColumnSpec::new("system", "peers", "rpc_address", DataType::Inet),
            ColumnSpec::new("system", "peers", "host_id", DataType::Uuid),
            ColumnSpec::new("system", "peers", "tokens", DataType::Set(Box::new(DataType::Varchar))),
        ];
        let rows = vec![
            vec![
                cell(Value::Inet("10.0.0.5".parse().unwrap())),
                cell(Value::Inet("0.0.0.0".parse().unwrap())),
                cell(Value::Uuid(Uuid::from_u128(1))),
                cell(Value::Set(vec![Value::Text("-9000".into())])),
            ],
            vec![
                cell(Value::Inet("10.0.0.6".parse().unwrap())),
                cell(Value::Inet("10.0.0.9".parse().unwrap())),
                None,
                cell(Value::Set(vec![])),
            ],
        ];
        RowsResult {
            metadata: RowsMetadata {
                column_count: columns.len(),
                columns,
                ..Default::default()
            },
            rows,
        }
    }

    #[test]
    fn test_row_count_and_iteration() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        assert_eq!(set.row_count(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.rows().len(), 2);
        let indexes: Vec<usize> = set.rows().map(|r| r.index()).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[test]
    fn test_by_name_matches_by_position() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        for row in set.rows() {
            for (i, column) in set.columns().iter().enumerate() {
                let by_name = row.by_name(&column.name).unwrap();
                let by_position = row.by_position(i).unwrap();
                assert_eq!(by_name, by_position, "column {}", column.name);
            }
        }
    }

    #[test]
    fn test_by_name_missing_column() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        let err = set.row(0).by_name("data_center").unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(ref name) if name == "data_center"));
    }

    #[test]
    fn test_by_position_out_of_bounds() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        let err = set.row(1).by_position(4).unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnIndexOutOfBounds { index: 4, count: 4 }
        ));
    }

    #[test]
    fn test_null_cell_decodes_to_null() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        assert!(set.row(1).by_name("host_id").unwrap().is_null());
    }

    #[test]
    fn test_decode_error_names_column() {
        let mut result = peers_result();
        result.rows[0][0] = Some(Bytes::from_static(&[1, 2, 3]));
        let set = RowSet::new(result, V4).unwrap();
        let err = set.row(0).by_name("peer").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().contains("column 'peer'"));
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let columns = vec![
            ColumnSpec::new("ks", "t", "v", DataType::Int),
            ColumnSpec::new("ks", "t", "v", DataType::Varchar),
        ];
        let result = RowsResult {
            metadata: RowsMetadata {
                column_count: 2,
                columns,
                ..Default::default()
            },
            rows: vec![vec![cell(Value::Int(1)), cell(Value::Text("two".into()))]],
        };
        let set = RowSet::new(result, V4).unwrap();
        assert_eq!(set.column_index("v"), Some(0));
        assert_eq!(set.row(0).by_name("v").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_no_metadata_rejected() {
        let result = RowsResult {
            metadata: RowsMetadata {
                column_count: 1,
                ..Default::default()
            },
            rows: vec![vec![None]],
        };
        assert!(matches!(RowSet::new(result, V4), Err(Error::Decode(_))));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut result = peers_result();
        result.rows[1].pop();
        let err = RowSet::new(result, V4).unwrap_err();
        assert!(err.to_string().contains("row 1 has 3 cells"));
    }

    #[test]
    fn test_get_out_of_range() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        assert!(set.get(2).is_none());
    }

    #[test]
    #[should_panic(expected = "row index 2 out of range")]
    fn test_row_out_of_range_panics() {
        let set = RowSet::new(peers_result(), V4).unwrap();
        let _ = set.row(2);
    }
}
