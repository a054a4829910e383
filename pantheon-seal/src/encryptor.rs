use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::key_generator::{PublicKey, SecretKey};
use crate::{Ciphertext, Plaintext};

/// Marker types selecting which key material an [`Encryptor`] was built
/// with, so the compiler rather than a runtime check rejects calling
/// `encrypt_symmetric` on a public-key-only encryptor.
pub mod marker {
	/// Encryptor holds only a secret key (symmetric encryption).
	pub struct Sym;
	/// Encryptor holds only a public key (asymmetric encryption).
	pub struct Asym;
	/// Encryptor holds both keys.
	pub struct SymAsym;
}

pub use marker::{Asym, Sym, SymAsym};

/// Encrypts [`Plaintext`]s into [`Ciphertext`]s.
///
/// The client always builds a `SymAsym` encryptor (it has both keys from
/// its own [`KeyGenerator`](crate::KeyGenerator)): `QueryMake`'s selector
/// row uses asymmetric encryption so the server-side public key alone can
/// later validate it came from a held secret key, while `SendOneCiphertext`
/// uses the smaller symmetric ciphertext form.
pub struct Encryptor<T = SymAsym> {
	handle: AtomicPtr<c_void>,
	_marker: PhantomData<T>,
}

unsafe impl<T> Sync for Encryptor<T> {}
unsafe impl<T> Send for Encryptor<T> {}

impl Encryptor<Asym> {
	/// Builds an encryptor from a public key alone.
	pub fn with_public_key(context: &Context, public_key: &PublicKey) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::Encryptor_Create(
				context.get_handle(),
				public_key.get_handle(),
				null_mut(),
				&mut handle,
			)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
			_marker: PhantomData,
		})
	}
}

impl Encryptor<Sym> {
	/// Builds an encryptor from a secret key alone.
	pub fn with_secret_key(context: &Context, secret_key: &SecretKey) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::Encryptor_Create(
				context.get_handle(),
				null_mut(),
				secret_key.get_handle(),
				&mut handle,
			)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
			_marker: PhantomData,
		})
	}
}

impl Encryptor<SymAsym> {
	/// Builds an encryptor holding both keys.
	pub fn with_public_and_secret_key(
		context: &Context,
		public_key: &PublicKey,
		secret_key: &SecretKey,
	) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe {
			bindgen::Encryptor_Create(
				context.get_handle(),
				public_key.get_handle(),
				secret_key.get_handle(),
				&mut handle,
			)
		})?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
			_marker: PhantomData,
		})
	}
}

impl<T> Encryptor<T> {
	fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}
}

/// Trait implemented by encryptors that hold a public key.
pub trait AsymmetricEncryptor {
	/// Encrypts `plaintext` using the public key.
	fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext>;
}

/// Trait implemented by encryptors that hold a secret key.
pub trait SymmetricEncryptor {
	/// Encrypts `plaintext` using the secret key. Produces a smaller
	/// ciphertext than [`AsymmetricEncryptor::encrypt`].
	fn encrypt_symmetric(&self, plaintext: &Plaintext) -> Result<Ciphertext>;
}

impl AsymmetricEncryptor for Encryptor<Asym> {
	fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext> {
		encrypt_asymmetric(self.get_handle(), plaintext)
	}
}

impl AsymmetricEncryptor for Encryptor<SymAsym> {
	fn encrypt(&self, plaintext: &Plaintext) -> Result<Ciphertext> {
		encrypt_asymmetric(self.get_handle(), plaintext)
	}
}

impl SymmetricEncryptor for Encryptor<Sym> {
	fn encrypt_symmetric(&self, plaintext: &Plaintext) -> Result<Ciphertext> {
		encrypt_symmetric(self.get_handle(), plaintext)
	}
}

impl SymmetricEncryptor for Encryptor<SymAsym> {
	fn encrypt_symmetric(&self, plaintext: &Plaintext) -> Result<Ciphertext> {
		encrypt_symmetric(self.get_handle(), plaintext)
	}
}

fn encrypt_asymmetric(handle: *mut c_void, plaintext: &Plaintext) -> Result<Ciphertext> {
	let ciphertext = Ciphertext::new()?;

	convert_seal_error(unsafe {
		bindgen::Encryptor_Encrypt(handle, plaintext.get_handle(), ciphertext.get_handle())
	})?;

	Ok(ciphertext)
}

fn encrypt_symmetric(handle: *mut c_void, plaintext: &Plaintext) -> Result<Ciphertext> {
	let ciphertext = Ciphertext::new()?;

	convert_seal_error(unsafe {
		bindgen::Encryptor_EncryptSymmetric(handle, plaintext.get_handle(), ciphertext.get_handle())
	})?;

	Ok(ciphertext)
}

impl<T> Drop for Encryptor<T> {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Encryptor_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::modulus::SecurityLevel;
	use crate::{BfvEncryptionParametersBuilder, CoefficientModulus, KeyGenerator};

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
	fn can_encrypt_asymmetrically() {
		let context = make_context();
		let keygen = KeyGenerator::new(&context).unwrap();
		let public_key = keygen.create_public_key().unwrap();
		let secret_key = keygen.secret_key();

		let encryptor =
			Encryptor::<SymAsym>::with_public_and_secret_key(&context, &public_key, &secret_key)
				.unwrap();

		let mut plaintext = Plaintext::new().unwrap();
		plaintext.resize(1);
		plaintext.set_coefficient(0, 7);

		let ciphertext = encryptor.encrypt(&plaintext).unwrap();

		assert_eq!(ciphertext.num_polynomials(), 2);
	}

	#[test]
	fn can_encrypt_symmetrically() {
		let context = make_context();
		let keygen = KeyGenerator::new(&context).unwrap();
		let secret_key = keygen.secret_key();

		let encryptor = Encryptor::<Sym>::with_secret_key(&context, &secret_key).unwrap();

		let mut plaintext = Plaintext::new().unwrap();
		plaintext.resize(1);
		plaintext.set_coefficient(0, 7);

		let ciphertext = encryptor.encrypt_symmetric(&plaintext).unwrap();

		assert_eq!(ciphertext.num_polynomials(), 2);
	}
}
