//! Noise stages that corrupt fragments in place.
//!
//! [`schema::SchemaPerturbator`] rewrites column names, and
//! [`value::ValuePerturbator`] rewrites cell values. Both operate on the
//! overlapping parts of a fragment, where corruption makes matching
//! fragments back together non-trivial.

pub mod schema;
pub mod value;
