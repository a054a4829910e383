use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::error::{convert_seal_error, Result};
use crate::memory::MemoryPool;

/// A flat array of polynomials sharing a single RNS representation.
///
/// The server pipeline's `get_sum` divide-and-conquer step accumulates
/// partial ciphertexts as raw polynomial arrays rather than full
/// `Ciphertext` objects, avoiding repeated NTT metadata bookkeeping; this
/// type is the handle for that.
pub struct PolynomialArray {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for PolynomialArray {}
unsafe impl Send for PolynomialArray {}

impl PolynomialArray {
	/// Creates an array with `poly_count` polynomials, each with
	/// `coeff_count` coefficients over `coeff_modulus_size` RNS components,
	/// allocated out of `pool`.
	pub fn new(
		poly_count: u64,
		coeff_count: u64,
		coeff_modulus_size: u64,
		pool: &MemoryPool,
	) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::PolyArray_Create(
				poly_count,
				coeff_count,
				coeff_modulus_size,
				pool.get_handle(),
				&mut handle,
			)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	/// Returns the number of polynomials in this array.
	pub fn poly_count(&self) -> u64 {
		let mut count: u64 = 0;

		convert_seal_error(unsafe { bindgen::PolyArray_PolyCount(self.get_handle(), &mut count) })
			.expect("internal error");

		count
	}

	/// Returns the coefficient at the given polynomial/RNS-component/index
	/// position.
	pub fn get_coefficient(&self, poly: u64, rns_component: u64, index: u64) -> u64 {
		let mut value: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::PolyArray_CoeffAt(self.get_handle(), poly, rns_component, index, &mut value)
		})
		.expect("internal error");

		value
	}
}

impl Drop for PolynomialArray {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::PolyArray_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn can_create_polynomial_array() {
		let pool = MemoryPool::new().unwrap();
		let array = PolynomialArray::new(2, 8192, 3, &pool).unwrap();

		assert_eq!(array.poly_count(), 2);
	}
}
