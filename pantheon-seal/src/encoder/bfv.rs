use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::context::Context;
use crate::encoder::Encoder;
use crate::error::{convert_seal_error, Result};
use crate::Plaintext;

/// Packs up to `N/2` × 2 plaintext integers modulo `t` into a single
/// [`Plaintext`] via CRT batching, and unpacks them back out.
///
/// The database encoder relies on the slot layout being the 2×(N/2) matrix
/// SEAL documents: row 0 occupies slots `[0, N/2)`, row 1 occupies
/// `[N/2, N)`. `rotate_rows`/`rotate_columns` in the evaluator act on this
/// same layout.
pub struct BatchEncoder {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for BatchEncoder {}
unsafe impl Send for BatchEncoder {}

impl BatchEncoder {
	/// Creates a batch encoder for `context`. Fails if the context's plain
	/// modulus isn't NTT-friendly (i.e. doesn't support batching).
	pub fn new(context: &Context) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::BatchEncoder_Create(context.get_handle(), &mut handle) })?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	/// Returns the number of slots available (`N`, the polynomial modulus
	/// degree).
	pub fn slot_count(&self) -> u64 {
		let mut count: u64 = 0;

		convert_seal_error(unsafe { bindgen::BatchEncoder_GetSlotCount(self.get_handle(), &mut count) })
			.expect("internal error");

		count
	}
}

impl Encoder<Vec<u64>> for BatchEncoder {
	fn encode(&self, data: &Vec<u64>) -> Result<Plaintext> {
		let plaintext = Plaintext::new()?;

		convert_seal_error(unsafe {
			bindgen::BatchEncoder_Encode1(
				self.get_handle(),
				data.len() as u64,
				data.as_ptr() as *mut u64,
				plaintext.get_handle(),
			)
		})?;

		Ok(plaintext)
	}

	fn decode(&self, plaintext: &Plaintext) -> Result<Vec<u64>> {
		let mut count = self.slot_count();
		let mut data: Vec<u64> = vec![0; count as usize];

		convert_seal_error(unsafe {
			bindgen::BatchEncoder_Decode1(
				self.get_handle(),
				plaintext.get_handle(),
				&mut count,
				data.as_mut_ptr(),
			)
		})?;

		data.truncate(count as usize);

		Ok(data)
	}
}

impl Drop for BatchEncoder {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::BatchEncoder_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::modulus::SecurityLevel;
	use crate::{BfvEncryptionParametersBuilder, CoefficientModulus};

	#[test]
	fn can_round_trip_encode_decode() {
		let params = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(8192)
			.set_coefficient_modulus(
				CoefficientModulus::bfv_default(8192, SecurityLevel::Tc128).unwrap(),
			)
			.set_plain_modulus_constant(65537)
			.build()
			.unwrap();

		let context = Context::new(&params, true, SecurityLevel::Tc128).unwrap();
		let encoder = BatchEncoder::new(&context).unwrap();

		let data: Vec<u64> = vec![1, 2, 3, 4];
		let plaintext = encoder.encode(&data).unwrap();
		let decoded = encoder.decode(&plaintext).unwrap();

		assert_eq!(&decoded[..4], &data[..]);
	}
}
