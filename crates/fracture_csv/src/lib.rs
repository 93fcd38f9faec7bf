//! Delimited-text ingestion and output for relations.
//!
//! Reading turns a whole csv/tsv input into one in-memory
//! [`fracture_core::relation::Relation`] with typed columns; writing puts a
//! relation back on disk with optional row or column shuffling and reports
//! the column order it used.

pub mod dialect;
pub mod errors;
pub mod reader;
pub mod writer;

pub use dialect::DialectOptions;
pub use reader::read_relation;
pub use writer::{RowOrder, WrittenLayout, write_relation};
