#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Rust bindings for the BFV scheme of Microsoft's SEAL homomorphic encryption
//! library.
//!
//! # Notes
//! All types in this crate implement Sync/Send. So long as you never dereference the
//! internal handle on any type after it has been dropped, these traits
//! should safely hold. The internal handles should be of little use to you anyways.
//!
//! This crate is the one load-bearing FFI boundary in the workspace: it owns
//! every `unsafe` call and every SEAL handle. Nothing above it
//! (`pantheon-crypto`, `pantheon-core`, `pantheon`) touches the `bindgen`
//! module directly, or performs homomorphic arithmetic of its own. CKKS, the
//! float encoders, and the tensor extensions that upstream SEAL bindings
//! carry are intentionally absent here: this fork only ever drives BFV.

#![warn(missing_docs)]

#[cfg(not(target_arch = "wasm32"))]
extern crate link_cplusplus;

#[allow(dead_code)]
#[allow(non_camel_case_types)]
mod bindgen {
	use std::os::raw::c_long;

	include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

	pub const E_OK: c_long = 0x0;
	pub const E_POINTER: c_long = 0x80004003u32 as c_long;
	pub const E_INVALIDARG: c_long = 0x80070057u32 as c_long;
	pub const E_OUTOFMEMORY: c_long = 0x8007000Eu32 as c_long;
	pub const E_UNEXPECTED: c_long = 0x8000FFFFu32 as c_long;
}

mod ciphertext;
mod context;
mod context_data;
mod decryptor;
mod encoder;
mod encryptor;
mod error;
mod evaluator;
mod key_generator;
mod memory;
mod modulus;
mod parameters;
mod plaintext;
mod poly_array;
mod serialization;

pub use ciphertext::Ciphertext;
pub use context::Context;
pub use context_data::ContextData;
pub use decryptor::Decryptor;
pub use encoder::BatchEncoder;
pub use encryptor::{
	marker as enc_marker, Asym, AsymmetricEncryptor, Encryptor, Sym, SymAsym, SymmetricEncryptor,
};
pub use error::{Error, Result};
pub use evaluator::{BfvEvaluator, Evaluator};
pub use key_generator::{GaloisKeys, KeyGenerator, PublicKey, RelinearizationKeys, SecretKey};
pub use memory::MemoryPool;
pub use modulus::{CoefficientModulus, Modulus, PlainModulus, SecurityLevel};
pub use parameters::{BfvEncryptionParametersBuilder, EncryptionParameters, SchemeType};
pub use plaintext::Plaintext;
pub use poly_array::PolynomialArray;
pub use serialization::{FromBytes, ToBytes};
