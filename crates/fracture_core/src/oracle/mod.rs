//! External collaborators behind narrow interfaces: key discovery, schema
//! decomposition, and lexical lookups.
//!
//! Each trait ships with a default implementation so the pipeline runs out
//! of the box, while tests and callers can substitute their own.

pub mod decompose;
pub mod keys;
pub mod lexicon;
