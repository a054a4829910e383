use crate::bindgen;
use crate::error::{convert_seal_error, Error, Result};
use crate::parameters::{EncryptionParameters, SchemeType};
use crate::{Modulus, PlainModulus};

/// Builds a set of BFV [`EncryptionParameters`].
///
/// Every parameter contract in this workspace goes through this builder:
/// the Parameter Contract module validates `(N, t, D_ms)` and then calls
/// this to materialize the SEAL-side object the rest of the pipeline is
/// built on.
#[derive(Default)]
pub struct BfvEncryptionParametersBuilder {
	poly_modulus_degree: Option<u64>,
	coefficient_modulus: CoefficientModulusTypeOpt,
	plain_modulus: PlainModulusTypeOpt,
}

#[derive(Default)]
enum CoefficientModulusTypeOpt {
	#[default]
	NotSet,
	Modulus(Vec<Modulus>),
}

#[derive(Default)]
enum PlainModulusTypeOpt {
	#[default]
	NotSet,
	Constant(u64),
	Modulus(Modulus),
}

impl BfvEncryptionParametersBuilder {
	/// Starts building a fresh set of BFV parameters.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the polynomial modulus degree `N`. Must be a power of two.
	pub fn set_poly_modulus_degree(mut self, degree: u64) -> Self {
		self.poly_modulus_degree = Some(degree);
		self
	}

	/// Sets the coefficient modulus chain directly.
	pub fn set_coefficient_modulus(mut self, modulus: Vec<Modulus>) -> Self {
		self.coefficient_modulus = CoefficientModulusTypeOpt::Modulus(modulus);
		self
	}

	/// Sets the plaintext modulus `t` to a fixed value, e.g. the Fermat
	/// prime `65537` the equality-check primitive depends on.
	pub fn set_plain_modulus_constant(mut self, modulus: u64) -> Self {
		self.plain_modulus = PlainModulusTypeOpt::Constant(modulus);
		self
	}

	/// Sets the plaintext modulus to an explicit, already-constructed
	/// [`Modulus`].
	pub fn set_plain_modulus(mut self, modulus: Modulus) -> Self {
		self.plain_modulus = PlainModulusTypeOpt::Modulus(modulus);
		self
	}

	/// Sets the plaintext modulus to the default NTT-friendly (batching)
	/// prime of `bit_size` bits for the configured `poly_modulus_degree`.
	///
	/// This is a convenience for callers that don't need the exact Fermat
	/// prime the equality check uses; the PIR parameter contract itself
	/// always calls [`Self::set_plain_modulus_constant`] with `65537`.
	pub fn set_plain_modulus_batching(self, bit_size: i32) -> Result<Self> {
		let degree = self
			.poly_modulus_degree
			.ok_or(Error::DegreeNotSet)?;
		let modulus = PlainModulus::batching(degree, bit_size)?;

		Ok(self.set_plain_modulus(modulus))
	}

	/// Validates the accumulated fields and builds the parameters.
	pub fn build(self) -> Result<EncryptionParameters> {
		let params = EncryptionParameters::new(SchemeType::Bfv)?;

		let degree = self.poly_modulus_degree.ok_or(Error::DegreeNotSet)?;

		convert_seal_error(unsafe {
			bindgen::EncParams_SetPolyModulusDegree(params.get_handle(), degree)
		})?;

		let coefficient_modulus = match self.coefficient_modulus {
			CoefficientModulusTypeOpt::NotSet => return Err(Error::CoefficientModulusNotSet),
			CoefficientModulusTypeOpt::Modulus(m) => m,
		};

		let coefficient_modulus_handles: Vec<_> =
			coefficient_modulus.iter().map(|m| m.get_handle()).collect();

		convert_seal_error(unsafe {
			bindgen::EncParams_SetCoeffModulus(
				params.get_handle(),
				coefficient_modulus_handles.len() as u64,
				coefficient_modulus_handles.as_ptr() as *mut std::ffi::c_void,
			)
		})?;

		let plain_modulus = match self.plain_modulus {
			PlainModulusTypeOpt::NotSet => return Err(Error::PlainModulusNotSet),
			PlainModulusTypeOpt::Constant(c) => PlainModulus::raw(c)?,
			PlainModulusTypeOpt::Modulus(m) => m,
		};

		convert_seal_error(unsafe {
			bindgen::EncParams_SetPlainModulus(params.get_handle(), plain_modulus.get_handle())
		})?;

		Ok(params)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::modulus::SecurityLevel;
	use crate::CoefficientModulus;

	#[test]
	fn can_build_bfv_parameters() {
		let params = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(8192)
			.set_coefficient_modulus(
				CoefficientModulus::bfv_default(8192, SecurityLevel::Tc128).unwrap(),
			)
			.set_plain_modulus_constant(65537)
			.build()
			.unwrap();

		assert_eq!(params.get_poly_modulus_degree(), 8192);
		assert_eq!(params.get_scheme(), SchemeType::Bfv);
	}

	#[test]
	fn build_fails_without_coefficient_modulus() {
		let result = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(8192)
			.set_plain_modulus_constant(65537)
			.build();

		assert!(matches!(result, Err(Error::CoefficientModulusNotSet)));
	}
}
