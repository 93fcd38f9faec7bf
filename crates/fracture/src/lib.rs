//! Command line tool that splits one relation into overlapping fragments
//! and corrupts them with schema and value noise, for benchmarking data
//! integration systems against a known ground truth.

pub mod args;
pub mod errors;
pub mod output;
pub mod pipeline;
