use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::context::Context;
use crate::error::{convert_seal_error, Result};
use crate::evaluator::Evaluator;
use crate::{Ciphertext, GaloisKeys, Plaintext, RelinearizationKeys};

/// The evaluator implementation backing every homomorphic operation in
/// this workspace.
pub struct BfvEvaluator {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for BfvEvaluator {}
unsafe impl Send for BfvEvaluator {}

impl BfvEvaluator {
	/// Creates an evaluator for `context`.
	pub fn new(context: &Context) -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::Evaluator_Create(context.get_handle(), &mut handle) })?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}
}

macro_rules! unary_inplace {
	($name:ident, $bindgen_fn:ident) => {
		fn $name(&self, a: &mut Ciphertext) -> Result<()> {
			convert_seal_error(unsafe { bindgen::$bindgen_fn(self.get_handle(), a.get_handle(), a.get_handle()) })
		}
	};
}

macro_rules! binary_inplace {
	($name:ident, $bindgen_fn:ident) => {
		fn $name(&self, a: &mut Ciphertext, b: &Ciphertext) -> Result<()> {
			convert_seal_error(unsafe {
				bindgen::$bindgen_fn(self.get_handle(), a.get_handle(), b.get_handle(), a.get_handle())
			})
		}
	};
}

impl Evaluator for BfvEvaluator {
	type Plaintext = Plaintext;
	type Ciphertext = Ciphertext;

	unary_inplace!(negate_inplace, Evaluator_Negate);

	fn negate(&self, a: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.negate_inplace(&mut out)?;
		Ok(out)
	}

	binary_inplace!(add_inplace, Evaluator_Add);

	fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.add_inplace(&mut out, b)?;
		Ok(out)
	}

	fn add_many(&self, a: &[Ciphertext]) -> Result<Ciphertext> {
		let handles: Vec<_> = a.iter().map(|c| c.get_handle()).collect();
		let result = Ciphertext::new()?;

		convert_seal_error(unsafe {
			bindgen::Evaluator_AddMany(
				self.get_handle(),
				handles.len() as u64,
				handles.as_ptr() as *mut c_void,
				result.get_handle(),
			)
		})?;

		Ok(result)
	}

	binary_inplace!(sub_inplace, Evaluator_Sub);

	fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.sub_inplace(&mut out, b)?;
		Ok(out)
	}

	binary_inplace!(multiply_inplace, Evaluator_Multiply);

	fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.multiply_inplace(&mut out, b)?;
		Ok(out)
	}

	fn multiply_many(&self, a: &[Ciphertext], relin_keys: &RelinearizationKeys) -> Result<Ciphertext> {
		let handles: Vec<_> = a.iter().map(|c| c.get_handle()).collect();
		let result = Ciphertext::new()?;

		convert_seal_error(unsafe {
			bindgen::Evaluator_MultiplyMany(
				self.get_handle(),
				handles.len() as u64,
				handles.as_ptr() as *mut c_void,
				relin_keys.get_handle(),
				result.get_handle(),
			)
		})?;

		Ok(result)
	}

	fn square_inplace(&self, a: &mut Ciphertext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_Square(self.get_handle(), a.get_handle(), a.get_handle())
		})
	}

	fn square(&self, a: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.square_inplace(&mut out)?;
		Ok(out)
	}

	fn exponentiate_inplace(
		&self,
		a: &mut Ciphertext,
		exponent: u64,
		relin_keys: &RelinearizationKeys,
	) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_Exponentiate(
				self.get_handle(),
				a.get_handle(),
				exponent,
				relin_keys.get_handle(),
				a.get_handle(),
			)
		})
	}

	fn exponentiate(
		&self,
		a: &Ciphertext,
		exponent: u64,
		relin_keys: &RelinearizationKeys,
	) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.exponentiate_inplace(&mut out, exponent, relin_keys)?;
		Ok(out)
	}

	fn relinearize_inplace(&self, a: &mut Ciphertext, relin_keys: &RelinearizationKeys) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_Relinearize(
				self.get_handle(),
				a.get_handle(),
				relin_keys.get_handle(),
				a.get_handle(),
			)
		})
	}

	fn relinearize(&self, a: &Ciphertext, relin_keys: &RelinearizationKeys) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.relinearize_inplace(&mut out, relin_keys)?;
		Ok(out)
	}

	fn mod_switch_to_next_inplace(&self, a: &mut Ciphertext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_ModSwitchToNext1(self.get_handle(), a.get_handle(), a.get_handle())
		})
	}

	fn mod_switch_to_next(&self, a: &Ciphertext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.mod_switch_to_next_inplace(&mut out)?;
		Ok(out)
	}

	fn add_plain_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_AddPlain(self.get_handle(), a.get_handle(), b.get_handle(), a.get_handle())
		})
	}

	fn add_plain(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.add_plain_inplace(&mut out, b)?;
		Ok(out)
	}

	fn sub_plain_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_SubPlain(self.get_handle(), a.get_handle(), b.get_handle(), a.get_handle())
		})
	}

	fn sub_plain(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.sub_plain_inplace(&mut out, b)?;
		Ok(out)
	}

	fn multiply_plain_inplace(&self, a: &mut Ciphertext, b: &Plaintext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_MultiplyPlain(self.get_handle(), a.get_handle(), b.get_handle(), a.get_handle())
		})
	}

	fn multiply_plain(&self, a: &Ciphertext, b: &Plaintext) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.multiply_plain_inplace(&mut out, b)?;
		Ok(out)
	}

	fn rotate_rows_inplace(&self, a: &mut Ciphertext, steps: i32, galois_keys: &GaloisKeys) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_RotateRows(
				self.get_handle(),
				a.get_handle(),
				steps,
				galois_keys.get_handle(),
				a.get_handle(),
			)
		})
	}

	fn rotate_rows(&self, a: &Ciphertext, steps: i32, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.rotate_rows_inplace(&mut out, steps, galois_keys)?;
		Ok(out)
	}

	fn rotate_columns_inplace(&self, a: &mut Ciphertext, galois_keys: &GaloisKeys) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_RotateColumns(
				self.get_handle(),
				a.get_handle(),
				galois_keys.get_handle(),
				a.get_handle(),
			)
		})
	}

	fn rotate_columns(&self, a: &Ciphertext, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
		let mut out = a.clone();
		self.rotate_columns_inplace(&mut out, galois_keys)?;
		Ok(out)
	}

	fn transform_to_ntt_inplace(&self, a: &mut Ciphertext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_TransformToNTT1(self.get_handle(), a.get_handle(), a.get_handle())
		})
	}

	fn transform_from_ntt_inplace(&self, a: &mut Ciphertext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_TransformFromNTT1(self.get_handle(), a.get_handle(), a.get_handle())
		})
	}

	fn transform_plaintext_to_ntt_inplace(&self, a: &mut Plaintext, context: &Context) -> Result<()> {
		let mut parms_id = context.get_first_context_data()?.parms_id();

		convert_seal_error(unsafe {
			bindgen::Evaluator_TransformToNTT2(
				self.get_handle(),
				a.get_handle(),
				parms_id.as_mut_ptr(),
				a.get_handle(),
			)
		})
	}

	fn transform_plaintext_from_ntt_inplace(&self, a: &mut Plaintext) -> Result<()> {
		convert_seal_error(unsafe {
			bindgen::Evaluator_TransformFromNTT2(self.get_handle(), a.get_handle(), a.get_handle())
		})
	}
}

impl Drop for BfvEvaluator {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::Evaluator_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::encryptor::{AsymmetricEncryptor, Encryptor, SymAsym};
	use crate::modulus::SecurityLevel;
	use crate::{BfvEncryptionParametersBuilder, CoefficientModulus, Decryptor, KeyGenerator};

	fn setup() -> (Context, BfvEvaluator, Encryptor<SymAsym>, Decryptor, RelinearizationKeys) {
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
		let relin_keys = keygen.create_relinearization_keys().unwrap();

		let encryptor =
			Encryptor::<SymAsym>::with_public_and_secret_key(&context, &public_key, &secret_key)
				.unwrap();
		let decryptor = Decryptor::new(&context, &secret_key).unwrap();
		let evaluator = BfvEvaluator::new(&context).unwrap();

		(context, evaluator, encryptor, decryptor, relin_keys)
	}

	#[test]
	fn add_of_ciphertexts_decrypts_to_sum() {
		let (_context, evaluator, encryptor, decryptor, _relin) = setup();

		let mut a = Plaintext::new().unwrap();
		a.resize(1);
		a.set_coefficient(0, 3);
		let mut b = Plaintext::new().unwrap();
		b.resize(1);
		b.set_coefficient(0, 4);

		let ca = encryptor.encrypt(&a).unwrap();
		let cb = encryptor.encrypt(&b).unwrap();

		let sum = evaluator.add(&ca, &cb).unwrap();
		let decoded = decryptor.decrypt(&sum).unwrap();

		assert_eq!(decoded.get_coefficient(0), 7);
	}

	#[test]
	fn multiply_then_relinearize_keeps_two_polynomials() {
		let (_context, evaluator, encryptor, _decryptor, relin_keys) = setup();

		let mut a = Plaintext::new().unwrap();
		a.resize(1);
		a.set_coefficient(0, 3);
		let mut b = Plaintext::new().unwrap();
		b.resize(1);
		b.set_coefficient(0, 4);

		let ca = encryptor.encrypt(&a).unwrap();
		let cb = encryptor.encrypt(&b).unwrap();

		let mut product = evaluator.multiply(&ca, &cb).unwrap();
		evaluator.relinearize_inplace(&mut product, &relin_keys).unwrap();

		assert_eq!(product.num_polynomials(), 2);
	}
}
