use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::key_generator::SecretKey;
use crate::{Ciphertext, Plaintext};

/// Decrypts [`Ciphertext`]s with a held [`SecretKey`].
///
/// Only the client ever constructs one of these: the server never holds a
/// secret key, by design.
pub struct Decryptor {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for Decryptor {}
unsafe impl Send for Decryptor {}

impl Decryptor {
	/// Creates a decryptor from `secret_key`.
	pub fn new(context: &Context, secret_key: &SecretKey) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::Decryptor_Create(context.get_handle(), secret_key.get_handle(), &mut handle)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}

	/// Decrypts `ciphertext` into a plaintext.
	pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Plaintext> {
		let plaintext = Plaintext::new()?;

		convert_seal_error(unsafe {
			bindgen::Decryptor_Decrypt(self.get_handle(), ciphertext.get_handle(), plaintext.get_handle())
		})?;

		Ok(plaintext)
	}

	/// Returns the invariant noise budget remaining in `ciphertext`, in
	/// bits. A budget of zero means further homomorphic operations will
	/// likely produce garbage on decryption.
	pub fn invariant_noise_budget(&self, ciphertext: &Ciphertext) -> Result<i32> {
		let mut budget: i32 = 0;

		convert_seal_error(unsafe {
			bindgen::Decryptor_InvariantNoiseBudget(
				self.get_handle(),
				ciphertext.get_handle(),
				&mut budget,
			)
		})?;

		Ok(budget)
	}
}

impl Drop for Decryptor {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Decryptor_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::encryptor::{AsymmetricEncryptor, Encryptor, SymAsym};
	use crate::modulus::SecurityLevel;
	use crate::{BfvEncryptionParametersBuilder, CoefficientModulus, KeyGenerator};

	#[test]
	fn can_decrypt_what_was_encrypted() {
		let params = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(8192)
			.set_coefficient_modulus(
				CoefficientModulus::bfv_default(8192, SecurityLevel::Tc128).unwrap(),
			)
			.set_plain_modulus_constant(65537)
			.build()
			.unwrap();

		let context = Context::new(&params, true, SecurityLevel::Tc128).unwrap();
		let keygen = KeyGenerator::new(&context).unwrap();
		let public_key = keygen.create_public_key().unwrap();
		let secret_key = keygen.secret_key();

		let encryptor =
			Encryptor::<SymAsym>::with_public_and_secret_key(&context, &public_key, &secret_key)
				.unwrap();
		let decryptor = Decryptor::new(&context, &secret_key).unwrap();

		let mut plaintext = Plaintext::new().unwrap();
		plaintext.resize(1);
		plaintext.set_coefficient(0, 1234);

		let ciphertext = encryptor.encrypt(&plaintext).unwrap();
		let decrypted = decryptor.decrypt(&ciphertext).unwrap();

		assert_eq!(decrypted.get_coefficient(0), 1234);
		assert!(decryptor.invariant_noise_budget(&ciphertext).unwrap() > 0);
	}
}
