//! This module contains re-exports from the generated protocol buffers code.
//!
//! The generated code is not meant to be used directly, but rather through the re-exports in this module.
use super::autogen::pantheon_proto;

/// A client's one-time upload of its Galois and relinearization keys. No
/// secret key material ever crosses this boundary.
pub use pantheon_proto::KeyBundle;

/// A client's one-time upload of the pre-encrypted ciphertext of `1`s the
/// server's equality-check fold consumes on every subsequent query.
pub use pantheon_proto::OneCiphertext;
