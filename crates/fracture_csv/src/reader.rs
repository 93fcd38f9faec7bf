//! Whole-relation ingestion from delimited text.

use std::collections::BTreeMap;
use std::io::Read;

use fracture_core::relation::{Attribute, Column, DataType, Relation};
use tracing::debug;

use crate::dialect::DialectOptions;
use crate::errors::{CsvError, Result};

/// Share of cells that must parse as numbers for a column to be typed
/// [`DataType::Float64`].
const NUMERIC_TYPE_THRESHOLD: f64 = 0.75;

/// Read a whole relation.
///
/// Column indices are assigned left to right. With `has_header`, the first
/// record provides column names; empty header cells become anonymous
/// columns. Ragged records are an error, as is an input without any data
/// records.
pub fn read_relation<R: Read>(
    input: R,
    dialect: &DialectOptions,
    has_header: bool,
) -> Result<Relation> {
    let mut csv_reader = dialect.reader_builder().from_reader(input);
    let mut records = csv_reader.records();

    let header = if has_header {
        match records.next() {
            Some(record) => Some(record?),
            None => return Err(CsvError::EmptyInput),
        }
    } else {
        None
    };

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in records {
        rows.push(record?);
    }
    if rows.is_empty() {
        return Err(CsvError::EmptyInput);
    }

    let num_columns = header
        .as_ref()
        .map(|h| h.len())
        .unwrap_or_else(|| rows[0].len());

    let mut columns = BTreeMap::new();
    for idx in 0..num_columns {
        let values: Vec<String> = rows
            .iter()
            .map(|row| row.get(idx).unwrap_or("").to_string())
            .collect();
        let name = header
            .as_ref()
            .and_then(|h| h.get(idx))
            .filter(|n| !n.is_empty())
            .map(|n| n.to_string());
        let attr = Attribute {
            name,
            datatype: infer_type(&values),
        };
        columns.insert(idx, Column::new(attr, values));
    }

    debug!(columns = num_columns, rows = rows.len(), "read relation");
    Ok(Relation::from_columns(columns))
}

fn infer_type(values: &[String]) -> DataType {
    let parseable = values
        .iter()
        .filter(|v| v.trim().parse::<f64>().is_ok())
        .count();
    if (parseable as f64) >= (values.len() as f64) * NUMERIC_TYPE_THRESHOLD {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}
