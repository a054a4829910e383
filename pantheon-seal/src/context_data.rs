use std::ffi::c_void;

use crate::bindgen;
use crate::error::convert_seal_error;
use crate::EncryptionParameters;

/// A read-only view of one link of the modulus switching chain:
/// the [`EncryptionParameters`] active at that link plus the pre-computed
/// data derived from them.
///
/// `ContextData` does not own its handle; it borrows from the `Context`
/// that produced it and is never constructed directly.
pub struct ContextData {
	handle: *mut c_void,
}

unsafe impl Sync for ContextData {}
unsafe impl Send for ContextData {}

impl ContextData {
	pub(crate) unsafe fn from_handle(handle: *mut c_void) -> Self {
		Self { handle }
	}

	/// Returns the parameters active at this link of the chain.
	pub fn parms(&self) -> EncryptionParameters {
		let mut borrowed: *mut c_void = std::ptr::null_mut();

		convert_seal_error(unsafe { bindgen::ContextData_Parms(self.handle, &mut borrowed) })
			.expect("internal error");

		// `borrowed` is owned by the context, not by us; clone it so the
		// `Drop` impl on the returned value has something of its own to
		// free.
		let mut handle: *mut c_void = std::ptr::null_mut();

		convert_seal_error(unsafe { bindgen::EncParams_Create2(borrowed, &mut handle) })
			.expect("internal error");

		EncryptionParameters { handle }
	}

	/// Returns the 256-bit `parms_id` hash of this link.
	pub fn parms_id(&self) -> [u64; 4] {
		let mut parms_id = [0u64; 4];

		convert_seal_error(unsafe {
			bindgen::ContextData_ParmsId(self.handle, parms_id.as_mut_ptr())
		})
		.expect("internal error");

		parms_id
	}

	/// Returns the chain index: 0 at the key level, increasing by one per
	/// modulus switch.
	pub fn chain_index(&self) -> u64 {
		let mut index: u64 = 0;

		convert_seal_error(unsafe { bindgen::ContextData_ChainIndex(self.handle, &mut index) })
			.expect("internal error");

		index
	}
}
