#![no_main]

use cql_topology::protocol::{decode_rows_result, ProtocolVersion};
use cql_topology::RowSet;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&version, body)) = data.split_first() else {
        return;
    };
    let Ok(version) = ProtocolVersion::try_from(version) else {
        return;
    };

    // Decode every cell too: column types come from the input
    if let Ok(result) = decode_rows_result(body, version) {
        if let Ok(rows) = RowSet::new(result, version) {
            for row in rows.rows() {
                for i in 0..rows.columns().len() {
                    let _ = row.by_position(i);
                }
            }
        }
    }
});
