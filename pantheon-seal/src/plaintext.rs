use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use serde::{Deserialize, Serialize};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::serialization::{CompressionType, FromBytes, ToBytes};

/// A plaintext polynomial: either a batch-encoded slot vector (the common
/// case in this workspace) or a raw coefficient polynomial.
pub struct Plaintext {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for Plaintext {}
unsafe impl Send for Plaintext {}

impl Plaintext {
	/// Creates a new, empty plaintext.
	pub fn new() -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Plaintext_Create1(&mut handle) })?;

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

	/// Resizes the underlying coefficient array.
	pub fn resize(&mut self, count: u64) {
		convert_seal_error(unsafe { bindgen::Plaintext_Resize(self.get_handle(), count) })
			.expect("internal error");
	}

	/// Returns the number of coefficients currently stored.
	pub fn len(&self) -> u64 {
		let mut size: u64 = 0;

		convert_seal_error(unsafe { bindgen::Plaintext_CoeffCount(self.get_handle(), &mut size) })
			.expect("internal error");

		size
	}

	/// Returns whether this plaintext has zero coefficients.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the coefficient at `index`.
	pub fn get_coefficient(&self, index: usize) -> u64 {
		let mut value: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::Plaintext_CoeffAt(self.get_handle(), index as u64, &mut value)
		})
		.expect("internal error");

		value
	}

	/// Sets the coefficient at `index`.
	pub fn set_coefficient(&mut self, index: usize, value: u64) {
		convert_seal_error(unsafe {
			bindgen::Plaintext_SetCoeffAt(self.get_handle(), index as u64, value)
		})
		.expect("internal error");
	}

	/// Returns whether this plaintext is in NTT (batched-slot) form.
	pub fn is_ntt_form(&self) -> bool {
		let mut result = false;

		convert_seal_error(unsafe { bindgen::Plaintext_IsNTTForm(self.get_handle(), &mut result) })
			.expect("internal error");

		result
	}
}

impl std::fmt::Debug for Plaintext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Plaintext")
			.field("len", &self.len())
			.field("is_ntt_form", &self.is_ntt_form())
			.finish()
	}
}

impl Clone for Plaintext {
	fn clone(&self) -> Self {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Plaintext_Create2(self.get_handle(), &mut handle) })
			.expect("internal error");

		unsafe { Self::from_handle(handle) }
	}
}

impl PartialEq for Plaintext {
	fn eq(&self, other: &Self) -> bool {
		if self.len() != other.len() {
			return false;
		}

		(0..self.len()).all(|i| self.get_coefficient(i as usize) == other.get_coefficient(i as usize))
	}
}

impl AsRef<Plaintext> for Plaintext {
	fn as_ref(&self) -> &Plaintext {
		self
	}
}

impl ToBytes for Plaintext {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		let mut num_bytes: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Plaintext_SaveSize(
				self.get_handle(),
				CompressionType::ZStd as u8,
				&mut num_bytes,
			)
		})?;

		let mut data: Vec<u8> = Vec::with_capacity(num_bytes as usize);
		let mut bytes_written: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Plaintext_Save(
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

impl FromBytes for Plaintext {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let plaintext = Plaintext::new()?;
		let mut bytes_read: i64 = 0;

		convert_seal_error(unsafe {
			bindgen::Plaintext_Load(
				plaintext.get_handle(),
				context.get_handle(),
				bytes.as_ptr() as *mut u8,
				bytes.len() as u64,
				&mut bytes_read,
			)
		})?;

		Ok(plaintext)
	}
}

impl Serialize for Plaintext {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let bytes = self.as_bytes().map_err(serde::ser::Error::custom)?;
		serializer.serialize_bytes(&bytes)
	}
}

impl Drop for Plaintext {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Plaintext_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_plaintext_is_empty() {
		let plaintext = Plaintext::new().unwrap();

		assert!(plaintext.is_empty());
	}

	#[test]
	fn can_set_and_read_coefficients() {
		let mut plaintext = Plaintext::new().unwrap();
		plaintext.resize(4);

		plaintext.set_coefficient(0, 42);

		assert_eq!(plaintext.get_coefficient(0), 42);
		assert_eq!(plaintext.len(), 4);
	}
}
