use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::error::{convert_seal_error, Result};

/// The security level guaranteed by a set of encryption parameters, as
/// standardized by the HomomorphicEncryption.org security standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
	/// No security guarantee. Only ever used in tests.
	None,
	/// 128 bits of security.
	Tc128,
	/// 192 bits of security.
	Tc192,
	/// 256 bits of security.
	Tc256,
}

impl Default for SecurityLevel {
	fn default() -> Self {
		Self::Tc128
	}
}

impl From<SecurityLevel> for i32 {
	fn from(level: SecurityLevel) -> Self {
		match level {
			SecurityLevel::None => 0,
			SecurityLevel::Tc128 => 128,
			SecurityLevel::Tc192 => 192,
			SecurityLevel::Tc256 => 256,
		}
	}
}

/// A single prime modulus, used either as a coefficient modulus component or
/// as the plaintext modulus.
pub struct Modulus {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for Modulus {}
unsafe impl Send for Modulus {}

impl Modulus {
	/// Wraps an existing native modulus handle.
	pub(crate) unsafe fn from_handle(handle: *mut c_void) -> Self {
		Self {
			handle: AtomicPtr::new(handle),
		}
	}


	/// Constructs a modulus from a raw prime value.
	pub fn new(value: u64) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Modulus_Create1(value, &mut handle) })?;

		Ok(unsafe { Self::from_handle(handle) })
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	/// Returns the prime value of this modulus.
	pub fn value(&self) -> u64 {
		let mut value: u64 = 0;

		convert_seal_error(unsafe { bindgen::Modulus_Value(self.get_handle(), &mut value) })
			.expect("internal error");

		value
	}
}

/// Wraps a handle this crate does not own (e.g. one borrowed out of an
/// `EncryptionParameters`) without cloning it.
pub(crate) unsafe fn unchecked_from_handle(handle: *mut c_void) -> Modulus {
	Modulus::from_handle(handle)
}

impl Clone for Modulus {
	fn clone(&self) -> Self {
		Self::new(self.value()).expect("failed to clone modulus")
	}
}

impl Drop for Modulus {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Modulus_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

/// Factory for coefficient modulus chains.
///
/// PIR deployments never hand-pick primes: [`Self::bfv_default`] asks SEAL
/// for a chain of NTT-friendly primes sized for 128-bit security at a given
/// polynomial modulus degree, which is what every scenario in this crate
/// uses.
pub struct CoefficientModulus;

impl CoefficientModulus {
	/// Returns the default coefficient modulus chain SEAL recommends for
	/// `poly_modulus_degree` at the given security level.
	pub fn bfv_default(poly_modulus_degree: u64, security_level: SecurityLevel) -> Result<Vec<Modulus>> {
		let mut len: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::CoeffModulus_BFVDefault(
				poly_modulus_degree,
				security_level.into(),
				&mut len,
				null_mut(),
			)
		})?;

		let mut handles: Vec<*mut c_void> = vec![null_mut(); len as usize];

		convert_seal_error(unsafe {
			bindgen::CoeffModulus_BFVDefault(
				poly_modulus_degree,
				security_level.into(),
				&mut len,
				handles.as_mut_ptr(),
			)
		})?;

		Ok(handles
			.into_iter()
			.map(|h| unsafe { Modulus::from_handle(h) })
			.collect())
	}

	/// Creates a custom coefficient modulus chain with the given bit sizes.
	pub fn create(poly_modulus_degree: u64, bit_sizes: &[i32]) -> Result<Vec<Modulus>> {
		let mut handles: Vec<*mut c_void> = vec![null_mut(); bit_sizes.len()];

		convert_seal_error(unsafe {
			bindgen::CoeffModulus_Create(
				poly_modulus_degree,
				bit_sizes.len() as u64,
				bit_sizes.as_ptr() as *mut i32,
				handles.as_mut_ptr(),
			)
		})?;

		Ok(handles
			.into_iter()
			.map(|h| unsafe { Modulus::from_handle(h) })
			.collect())
	}
}

/// Factory for plaintext moduli.
pub struct PlainModulus;

impl PlainModulus {
	/// Constructs a plaintext modulus that is NTT-friendly (supports CRT
	/// batching) for the given `poly_modulus_degree` and bit width.
	pub fn batching(poly_modulus_degree: u64, bit_size: i32) -> Result<Modulus> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::PlainModulus_Batching(poly_modulus_degree, bit_size, &mut handle)
		})?;

		Ok(unsafe { Modulus::from_handle(handle) })
	}

	/// Constructs a plaintext modulus from a raw value. Callers who need
	/// the Fermat-prime equality-check property (`t = 2^16 + 1`) use this
	/// rather than [`Self::batching`], which is free to pick any NTT-friendly
	/// prime of the requested width.
	pub fn raw(value: u64) -> Result<Modulus> {
		Modulus::new(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn can_create_modulus_from_raw_value() {
		let modulus = Modulus::new(65537).unwrap();

		assert_eq!(modulus.value(), 65537);
	}

	#[test]
	fn bfv_default_returns_nonempty_chain() {
		let chain = CoefficientModulus::bfv_default(8192, SecurityLevel::Tc128).unwrap();

		assert!(!chain.is_empty());
	}
}
