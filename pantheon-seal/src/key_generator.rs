use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::serialization::{CompressionType, FromBytes, ToBytes};

macro_rules! seal_handle_type {
	($name:ident, $destroy:ident) => {
		#[doc = concat!("A `", stringify!($name), "` produced by a `KeyGenerator`.")]
		pub struct $name {
			handle: AtomicPtr<c_void>,
		}

		unsafe impl Sync for $name {}
		unsafe impl Send for $name {}

		impl $name {
			pub(crate) unsafe fn from_handle(handle: *mut c_void) -> Self {
				Self {
					handle: AtomicPtr::new(handle),
				}
			}

			pub(crate) fn get_handle(&self) -> *mut c_void {
				self.handle.load(Ordering::SeqCst)
			}
		}

		impl Drop for $name {
			fn drop(&mut self) {
				convert_seal_error(unsafe { bindgen::$destroy(self.get_handle()) })
					.expect("internal error");
			}
		}
	};
}

seal_handle_type!(SecretKey, SecretKey_Destroy);
seal_handle_type!(PublicKey, PublicKey_Destroy);
seal_handle_type!(RelinearizationKeys, RelinKeys_Destroy);
seal_handle_type!(GaloisKeys, GaloisKeys_Destroy);

impl ToBytes for SecretKey {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		save_with(self.get_handle(), bindgen::SecretKey_SaveSize, bindgen::SecretKey_Save)
	}
}

impl FromBytes for SecretKey {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();
		convert_seal_error(unsafe { bindgen::SecretKey_Create1(&mut handle) })?;
		load_with(handle, context, bytes, bindgen::SecretKey_Load)?;
		Ok(unsafe { Self::from_handle(handle) })
	}
}

impl ToBytes for PublicKey {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		save_with(self.get_handle(), bindgen::PublicKey_SaveSize, bindgen::PublicKey_Save)
	}
}

impl FromBytes for PublicKey {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();
		convert_seal_error(unsafe { bindgen::PublicKey_Create1(&mut handle) })?;
		load_with(handle, context, bytes, bindgen::PublicKey_Load)?;
		Ok(unsafe { Self::from_handle(handle) })
	}
}

impl ToBytes for RelinearizationKeys {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		save_with(
			self.get_handle(),
			bindgen::KSwitchKeys_SaveSize,
			bindgen::KSwitchKeys_Save,
		)
	}
}

impl FromBytes for RelinearizationKeys {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();
		convert_seal_error(unsafe { bindgen::RelinKeys_Create1(&mut handle) })?;
		load_with(handle, context, bytes, bindgen::KSwitchKeys_Load)?;
		Ok(unsafe { Self::from_handle(handle) })
	}
}

impl ToBytes for GaloisKeys {
	fn as_bytes(&self) -> Result<Vec<u8>> {
		save_with(
			self.get_handle(),
			bindgen::KSwitchKeys_SaveSize,
			bindgen::KSwitchKeys_Save,
		)
	}
}

impl FromBytes for GaloisKeys {
	type State = Context;

	fn from_bytes(context: &Context, bytes: &[u8]) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();
		convert_seal_error(unsafe { bindgen::GaloisKeys_Create1(&mut handle) })?;
		load_with(handle, context, bytes, bindgen::KSwitchKeys_Load)?;
		Ok(unsafe { Self::from_handle(handle) })
	}
}

fn save_with(
	handle: *mut c_void,
	size_fn: unsafe extern "C" fn(*mut c_void, u8, *mut i64) -> i64,
	save_fn: unsafe extern "C" fn(*mut c_void, *mut u8, u64, u8, *mut i64) -> i64,
) -> Result<Vec<u8>> {
	let mut num_bytes: i64 = 0;

	convert_seal_error(unsafe { size_fn(handle, CompressionType::ZStd as u8, &mut num_bytes) })?;

	let mut data: Vec<u8> = Vec::with_capacity(num_bytes as usize);
	let mut bytes_written: i64 = 0;

	convert_seal_error(unsafe {
		save_fn(
			handle,
			data.as_mut_ptr(),
			num_bytes as u64,
			CompressionType::ZStd as u8,
			&mut bytes_written,
		)
	})?;

	unsafe { data.set_len(bytes_written as usize) };

	Ok(data)
}

fn load_with(
	handle: *mut c_void,
	context: &Context,
	bytes: &[u8],
	load_fn: unsafe extern "C" fn(*mut c_void, *mut c_void, *mut u8, u64, *mut i64) -> i64,
) -> Result<()> {
	let mut bytes_read: i64 = 0;

	convert_seal_error(unsafe {
		load_fn(
			handle,
			context.get_handle(),
			bytes.as_ptr() as *mut u8,
			bytes.len() as u64,
			&mut bytes_read,
		)
	})
}

/// Derives the key material for a [`Context`]: the secret key, the matching
/// public key, and (on demand) relinearization and Galois keys.
///
/// Every key except the secret key is produced once per client session and
/// shipped to the server over `SendKeys`; the secret key never leaves the
/// client.
pub struct KeyGenerator {
	handle: AtomicPtr<c_void>,
	context: Context,
}

unsafe impl Sync for KeyGenerator {}
unsafe impl Send for KeyGenerator {}

impl KeyGenerator {
	/// Creates a new key generator, generating a fresh secret key.
	pub fn new(context: &Context) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::KeyGenerator_Create1(context.get_handle(), &mut handle) })?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
			context: context.clone(),
		})
	}

	/// Recreates a key generator from an existing secret key, e.g. when
	/// reloading a persisted client session.
	pub fn from_secret_key(context: &Context, secret_key: &SecretKey) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::KeyGenerator_Create2(context.get_handle(), secret_key.get_handle(), &mut handle)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
			context: context.clone(),
		})
	}

	fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	/// Returns the secret key. Never transmitted over the wire.
	pub fn secret_key(&self) -> SecretKey {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::KeyGenerator_SecretKey(self.get_handle(), &mut handle) })
			.expect("internal error");

		unsafe { SecretKey::from_handle(handle) }
	}

	/// Creates the matching public key.
	pub fn create_public_key(&self) -> Result<PublicKey> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::KeyGenerator_CreatePublicKey(self.get_handle(), false, &mut handle) })?;

		Ok(unsafe { PublicKey::from_handle(handle) })
	}

	/// Creates relinearization keys, used to collapse a degree-2 ciphertext
	/// (the output of a multiplication) back down to degree-1.
	pub fn create_relinearization_keys(&self) -> Result<RelinearizationKeys> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::KeyGenerator_CreateRelinKeys(self.get_handle(), false, &mut handle)
		})?;

		Ok(unsafe { RelinearizationKeys::from_handle(handle) })
	}

	/// Creates Galois keys supporting every rotation/conjugation step SEAL's
	/// default step set provides.
	///
	/// The PIR pipeline's divide-and-conquer extraction and conjugate-fold
	/// only ever need power-of-two steps; [`Self::create_galois_keys_for_steps`]
	/// lets a caller request exactly those and keep the key blob small.
	pub fn create_galois_keys(&self) -> Result<GaloisKeys> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::KeyGenerator_CreateGaloisKeysFromElts(self.get_handle(), 0, null_mut(), false, &mut handle)
		})?;

		Ok(unsafe { GaloisKeys::from_handle(handle) })
	}

	/// Creates Galois keys for exactly the requested rotation steps.
	pub fn create_galois_keys_for_steps(&self, steps: &[i32]) -> Result<GaloisKeys> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::KeyGenerator_CreateGaloisKeysFromSteps(
				self.get_handle(),
				steps.len() as u64,
				steps.as_ptr() as *mut i32,
				false,
				&mut handle,
			)
		})?;

		Ok(unsafe { GaloisKeys::from_handle(handle) })
	}

	/// Returns the context this generator was created for.
	pub fn context(&self) -> &Context {
		&self.context
	}
}

impl Drop for KeyGenerator {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::KeyGenerator_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::modulus::SecurityLevel;
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
	fn can_generate_keys() {
		let context = make_context();
		let keygen = KeyGenerator::new(&context).unwrap();

		let _public_key = keygen.create_public_key().unwrap();
		let _relin_keys = keygen.create_relinearization_keys().unwrap();
		let _galois_keys = keygen.create_galois_keys().unwrap();
	}

	#[test]
	fn can_round_trip_secret_key_through_bytes() {
		let context = make_context();
		let keygen = KeyGenerator::new(&context).unwrap();
		let secret_key = keygen.secret_key();

		let bytes = secret_key.as_bytes().unwrap();
		let restored = SecretKey::from_bytes(&context, &bytes).unwrap();

		let _ = KeyGenerator::from_secret_key(&context, &restored).unwrap();
	}
}
