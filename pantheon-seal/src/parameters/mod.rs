use std::ffi::c_void;
use std::mem::forget;
use std::ptr::null_mut;

use serde::{Deserialize, Serialize};

use crate::bindgen;
use crate::error::{convert_seal_error, Result};
use crate::modulus::unchecked_from_handle;
use crate::Modulus;

mod bfv;
pub use bfv::BfvEncryptionParametersBuilder;

/// The FHE scheme an [`EncryptionParameters`] set configures.
///
/// This crate only ever drives BFV; `Ckks` and `None` exist because the
/// native parameter object still requires a scheme tag.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeType {
	/// No scheme. Never used directly.
	None = 0x0,
	/// Brakerski/Fan-Vercauteren scheme.
	Bfv = 0x1,
	/// Cheon-Kim-Kim-Song scheme. Unused by this workspace.
	Ckks = 0x2,
}

impl SchemeType {
	fn from_u8(val: u8) -> Self {
		match val {
			0x0 => SchemeType::None,
			0x1 => SchemeType::Bfv,
			0x2 => SchemeType::Ckks,
			_ => panic!("illegal scheme type"),
		}
	}
}

/// An immutable set of parameters defining a BFV encryption scheme instance:
/// polynomial modulus degree, coefficient modulus chain, and plaintext
/// modulus.
///
/// Build one with [`BfvEncryptionParametersBuilder`] rather than
/// constructing it directly; the 256-bit `parms_id` hash SEAL derives from
/// these fields is what every downstream object (contexts, keys,
/// ciphertexts) is pinned against.
pub struct EncryptionParameters {
	pub(crate) handle: *mut c_void,
}

unsafe impl Sync for EncryptionParameters {}
unsafe impl Send for EncryptionParameters {}

impl EncryptionParameters {
	/// Creates a new, unconfigured `EncryptionParameters` for `scheme`.
	pub fn new(scheme: SchemeType) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::EncParams_Create1(scheme as u8, &mut handle) })?;

		Ok(Self { handle })
	}

	/// Every `parms_id` is a 4-tuple of 64-bit words.
	pub const fn block_size() -> u8 {
		4
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle
	}

	/// Returns the polynomial modulus degree `N`.
	pub fn get_poly_modulus_degree(&self) -> u64 {
		let mut degree: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::EncParams_GetPolyModulusDegree(self.handle, &mut degree)
		})
		.expect("internal error");

		degree
	}

	/// Returns the scheme these parameters configure.
	pub fn get_scheme(&self) -> SchemeType {
		let mut scheme: u8 = 0;

		convert_seal_error(unsafe { bindgen::EncParams_GetScheme(self.handle, &mut scheme) })
			.expect("internal error");

		SchemeType::from_u8(scheme)
	}

	/// Returns the plaintext modulus `t`.
	pub fn get_plain_modulus(&self) -> Modulus {
		let mut borrowed_modulus = null_mut();

		convert_seal_error(unsafe {
			bindgen::EncParams_GetPlainModulus(self.handle, &mut borrowed_modulus)
		})
		.expect("internal error");

		let borrowed_modulus = unsafe { unchecked_from_handle(borrowed_modulus) };

		// We don't own the handle SEAL gave us, so clone it into one we do
		// own and forget the borrowed wrapper instead of dropping it.
		let ret = borrowed_modulus.clone();
		forget(borrowed_modulus);

		ret
	}

	/// Returns the coefficient modulus chain.
	pub fn get_coefficient_modulus(&self) -> Vec<Modulus> {
		let mut len: u64 = 0;

		convert_seal_error(unsafe {
			bindgen::EncParams_GetCoeffModulus(self.handle, &mut len, null_mut())
		})
		.expect("internal error");

		let mut handles: Vec<*mut c_void> = vec![null_mut(); len as usize];

		convert_seal_error(unsafe {
			bindgen::EncParams_GetCoeffModulus(self.handle, &mut len, handles.as_mut_ptr())
		})
		.expect("internal error");

		handles
			.iter()
			.map(|h| {
				let modulus = unsafe { unchecked_from_handle(*h) };
				let ret = modulus.clone();

				forget(modulus);

				ret
			})
			.collect()
	}

	/// Returns the 256-bit `parms_id` hash identifying this parameter set.
	pub fn get_parms_id(&self) -> Result<[u64; 4]> {
		let mut parms_id = [0u64; 4];

		convert_seal_error(unsafe {
			bindgen::EncParams_GetParmsId(self.handle, parms_id.as_mut_ptr())
		})?;

		Ok(parms_id)
	}
}

impl std::fmt::Debug for EncryptionParameters {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EncryptionParameters")
			.field("scheme", &self.get_scheme())
			.field("poly_modulus_degree", &self.get_poly_modulus_degree())
			.finish()
	}
}

impl Drop for EncryptionParameters {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::EncParams_Destroy(self.handle) })
			.expect("internal error");
	}
}
