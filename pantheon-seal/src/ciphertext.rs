use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use serde::{Deserialize, Serialize};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::serialization::{CompressionType, FromBytes, ToBytes};

/// A ciphertext produced by a BFV [`Encryptor`](crate::Encryptor), or by
/// homomorphic operations on other ciphertexts.
pub struct Ciphertext {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for Ciphertext {}
unsafe impl Send for Ciphertext {}

impl Ciphertext {
	/// Creates a new, empty ciphertext. Empty ciphertexts are typically used
	/// as an output parameter for an evaluator method.
	pub fn new() -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Ciphertext_Create1(&mut handle) })?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	pub(crate) unsafe fn from_handle(handle: *mut c_void) -> Self {
		Self {
			handle: AtomicPtr::new(handle),
		}
	}

	/// Returns the number of primitive polynomials (usually 2, or 3 after a
	/// multiplication without relinearization) making up this ciphertext.
	pub fn num_polynomials(&self) -> u64 {
		let mut size: u64 = 0;

		convert_seal_error(unsafe { bindgen::Ciphertext_Size(self.get_handle(), &mut size) })
			.expect("internal error");

		size
	}

	/// Returns the number of RNS components in the coefficient modulus this
	/// ciphertext was encrypted under.
	pub fn coeff_modulus_size(&self) -> u64 {
		let mut size: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::Ciphertext_CoeffModulusSize(self.get_handle(), &mut size)
		})
		.expect("internal error");

		size
	}

	/// Returns whether this ciphertext is in NTT (evaluation) form.
	pub fn is_ntt_form(&self) -> bool {
		let mut result = false;

		convert_seal_error(unsafe { bindgen::Ciphertext_IsNTTForm(self.get_handle(), &mut result) })
			.expect("internal error");

		result
	}
}

impl std::fmt::Debug for Ciphertext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Ciphertext")
			.field("num_polynomials", &self.num_polynomials())
			.field("is_ntt_form", &self.is_ntt_form())
			.finish()
	}
}

impl Clone for Ciphertext {
	fn clone(&self) -> Self {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Ciphertext_Create3(self.get_handle(), &mut handle) })
			.expect("internal error");

		Self {
			handle: AtomicPtr::new(handle),
		}
	}
}

impl AsRef<Ciphertext> for Ciphertext {
	fn as_ref(&self) -> &Ciphertext {
		self
	}
}

impl ToBytes for Ciphertext {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		let mut num_bytes: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Ciphertext_SaveSize(
				self.get_handle(),
				CompressionType::ZStd as u8,
				&mut num_bytes,
			)
		})?;

		let mut data: Vec<u8> = Vec::with_capacity(num_bytes as usize);
		let mut bytes_written: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Ciphertext_Save(
				self.get_handle(),
				data.as_mut_ptr(),
				num_bytes as u64,
				CompressionType::ZStd as u8,
				&mut bytes_written,
			)
		})?;

		unsafe { data.set_len(bytes_written as usize) };

		Ok(data)
	}
}

impl FromBytes for Ciphertext {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let ciphertext = Ciphertext::new()?;
		let mut bytes_read: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Ciphertext_Load(
				ciphertext.get_handle(),
				context.get_handle(),
				bytes.as_ptr() as *mut u8,
				bytes.len() as u64,
				&mut bytes_read,
			)
		})?;

		Ok(ciphertext)
	}
}

impl Serialize for Ciphertext {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let bytes = self.as_bytes().map_err(serde::ser::Error::custom)?;
		serializer.serialize_bytes(&bytes)
	}
}

impl Drop for Ciphertext {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Ciphertext_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn can_create_and_destroy_ciphertext() {
		let ciphertext = Ciphertext::new().unwrap();

		std::mem::drop(ciphertext);
	}

	#[test]
	fn new_ciphertext_is_not_ntt_form() {
		let ciphertext = Ciphertext::new().unwrap();

		assert!(!ciphertext.is_ntt_form());
		assert_eq!(ciphertext.num_polynomials(), 0);
	}
}
