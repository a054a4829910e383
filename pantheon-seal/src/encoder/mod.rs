use crate::error::Result;
use crate::Plaintext;

mod bfv;
pub use bfv::BatchEncoder;

/// Encodes and decodes between plain Rust values and [`Plaintext`]
/// polynomials.
pub trait Encoder<T> {
	/// Encodes `data` into a plaintext.
	fn encode(&self, data: &T) -> Result<Plaintext>;

	/// Decodes `plaintext` back into data.
	fn decode(&self, plaintext: &Plaintext) -> Result<T>;
}
