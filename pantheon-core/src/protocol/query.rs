//! This module contains re-exports from the generated protocol buffers code.
//!
//! The generated code is not meant to be used directly, but rather through the re-exports in this module.
use super::autogen::pantheon_proto;

/// A keyword-PIR query: one ciphertext per fingerprint column, encrypting
/// the rotated, replicated keyword fingerprint `QueryMake` built.
pub use pantheon_proto::QueryRequest;

/// The PIR response: one ciphertext per extracted value column, which the
/// client's `Reconstruct` step decrypts and reassembles.
pub use pantheon_proto::QueryResponse;
