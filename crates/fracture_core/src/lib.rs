//! Core engine for fragmenting a tabular relation and corrupting the
//! fragments with schema and value noise.
//!
//! The pipeline is: read one relation, split it into overlapping
//! horizontal/vertical fragments ([`partition`]), optionally decompose
//! fragments along functional dependencies ([`oracle`]), then rename
//! attributes and rewrite cell values ([`perturb`]) using the method
//! library in [`noise`].

pub mod errors;
pub mod noise;
pub mod oracle;
pub mod partition;
pub mod perturb;
pub mod relation;
