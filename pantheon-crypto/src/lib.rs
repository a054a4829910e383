//! Keyword-PIR parameter contract, database encoding, and threaded BFV
//! primitives.
//!
//! This crate sits between the raw BFV bindings in `pantheon_seal` and the
//! client/server wire protocol in `pantheon_core`: it owns the shared
//! `Parameters` contract, the fingerprint/database layout, and the batch
//! fan-out primitives the server pipeline is built from.

pub mod batch;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod parameters;
pub mod threaded;

pub use batch::Batch;
pub use db::{Database, MultiMapDatabase, ParetoParams, INVALID_INDEX, INVALID_KEY};
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, num_columns, pad_key, FingerprintPair, PLAIN_BIT};
pub use parameters::{Parameters, ParametersBuilder, DEFAULT_PLAIN_MODULUS};
