use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::Arc;

use crate::bindgen;
use crate::context_data::ContextData;
use crate::error::{convert_seal_error, Result};
use crate::modulus::SecurityLevel;
use crate::EncryptionParameters;

struct ContextHandle(AtomicPtr<c_void>);

unsafe impl Sync for ContextHandle {}
unsafe impl Send for ContextHandle {}

impl Drop for ContextHandle {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::SEALContext_Destroy(self.0.load(Ordering::SeqCst)) })
			.expect("internal error");
	}
}

/// Validates a set of [`EncryptionParameters`] and pre-computes the data
/// every other SEAL object is built against: the modulus switching chain,
/// NTT tables, and the parms_id of each link in the chain.
///
/// A `Context` is cheaply `Clone`-able (it's reference counted) and is
/// shared immutably across every worker thread in the server pipeline.
#[derive(Clone)]
pub struct Context {
	handle: Arc<ContextHandle>,
	params: Arc<EncryptionParameters>,
}

impl Context {
	/// Creates a context from `params`.
	///
	/// `expand_mod_chain` controls whether the full modulus switching chain
	/// is built (`true`, the common case) or only the top link (`false`).
	pub fn new(
		params: &EncryptionParameters,
		expand_mod_chain: bool,
		security_level: SecurityLevel,
	) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::SEALContext_Create(
				params.get_handle(),
				expand_mod_chain,
				security_level.into(),
				&mut handle,
			)
		})?;

		Ok(Self {
			handle: Arc::new(ContextHandle(AtomicPtr::new(handle))),
			params: Arc::new(clone_params(params)?),
		})
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle.0.load(Ordering::SeqCst)
	}

	/// Returns the parameters this context was built from.
	pub fn params(&self) -> &EncryptionParameters {
		&self.params
	}

	/// Returns the `ContextData` for the top link (key level) of the
	/// modulus switching chain.
	pub fn get_key_context_data(&self) -> Result<ContextData> {
		let mut data: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::SEALContext_KeyContextData(self.get_handle(), &mut data)
		})?;

		Ok(unsafe { ContextData::from_handle(data) })
	}

	/// Returns the `ContextData` for the first data-level link of the
	/// modulus switching chain.
	pub fn get_first_context_data(&self) -> Result<ContextData> {
		let mut data: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::SEALContext_FirstContextData(self.get_handle(), &mut data)
		})?;

		Ok(unsafe { ContextData::from_handle(data) })
	}

	/// Returns the `ContextData` for the last link of the modulus switching
	/// chain, i.e. after `D_ms` modulus switches.
	pub fn get_last_context_data(&self) -> Result<ContextData> {
		let mut data: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::SEALContext_LastContextData(self.get_handle(), &mut data)
		})?;

		Ok(unsafe { ContextData::from_handle(data) })
	}

	/// Returns whether the parameters are considered valid and secure at the
	/// requested security level.
	pub fn parameters_set(&self) -> bool {
		let mut result = false;

		convert_seal_error(unsafe {
			bindgen::SEALContext_ParametersSet(self.get_handle(), &mut result)
		})
		.expect("internal error");

		result
	}
}

fn clone_params(params: &EncryptionParameters) -> Result<EncryptionParameters> {
	let mut handle: *mut c_void = null_mut();

	convert_seal_error(unsafe { bindgen::EncParams_Create2(params.get_handle(), &mut handle) })?;

	Ok(EncryptionParameters { handle })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{BfvEncryptionParametersBuilder, CoefficientModulus};

	fn make_context() -> Context {
		let params = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(8192)
			.set_coefficient_modulus(
				CoefficientModulus::bfv_default(8192, SecurityLevel::Tc128).unwrap(),
			)
			.set_plain_modulus_constant(65537)
			.build()
			.unwrap();

		Context::new(&params, true, SecurityLevel::Tc128).unwrap()
	}

	#[test]
	fn can_create_context() {
		let context = make_context();

		assert!(context.parameters_set());
	}
}
