use pantheon_seal::{
	BfvEncryptionParametersBuilder, CoefficientModulus, Context, EncryptionParameters, SecurityLevel,
};

use crate::error::{Error, Result};
use crate::fingerprint;

/// The Fermat prime `t = 2^16 + 1` the equality-check fingerprint depends
/// on: `PLAIN_BIT = 16` squarings of `x` compute `x^(t-1)`, which is `1`
/// for every nonzero `x` and `0` for `x = 0` (mod `t`).
pub const DEFAULT_PLAIN_MODULUS: u64 = 65_537;

/// The shared parameter contract (§4.1): everything the client and server
/// agree on before a query is ever made.
///
/// Built once by [`ParametersBuilder`]; every derived quantity (`NUM_COL`,
/// `NUM_ROW`, the PIR column/row counts, the squaring count, the Galois
/// step list) is computed at build time so downstream modules never
/// recompute them from the raw fields.
pub struct Parameters {
	n: usize,
	key_size_bits: usize,
	obj_size_bytes: usize,
	poly_modulus_degree: u64,
	plain_modulus: u64,
	modulus_switch_depth: usize,
	num_col: usize,
	num_row: usize,
	pir_num_columns_per_obj: usize,
	pir_db_rows: usize,
	pir_num_query_ciphertext: usize,
	squarings: u32,
	context: Context,
	enc_params: EncryptionParameters,
}

impl Parameters {
	/// `n`, the logical table size.
	pub fn item_count(&self) -> usize {
		self.n
	}

	/// Keyword width in bits.
	pub fn key_size_bits(&self) -> usize {
		self.key_size_bits
	}

	/// Value width in bytes.
	pub fn obj_size_bytes(&self) -> usize {
		self.obj_size_bytes
	}

	/// `N`, the polynomial modulus degree.
	pub fn poly_modulus_degree(&self) -> u64 {
		self.poly_modulus_degree
	}

	/// `t`, the plaintext modulus.
	pub fn plain_modulus(&self) -> u64 {
		self.plain_modulus
	}

	/// `D_ms`, the modulus-switch depth applied to `one_ct` and the
	/// equality-check intermediate results.
	pub fn modulus_switch_depth(&self) -> usize {
		self.modulus_switch_depth
	}

	/// `NUM_COL`, the number of fingerprint columns a keyword hashes into.
	pub fn num_col(&self) -> usize {
		self.num_col
	}

	/// `NUM_ROW`, the number of row-batches the table is split into.
	pub fn num_row(&self) -> usize {
		self.num_row
	}

	/// `pir_num_columns_per_obj`, plaintext slots consumed per value.
	pub fn pir_num_columns_per_obj(&self) -> usize {
		self.pir_num_columns_per_obj
	}

	/// `pir_db_rows`, total value-plaintext row count.
	pub fn pir_db_rows(&self) -> usize {
		self.pir_db_rows
	}

	/// `pir_num_query_ciphertext`, ciphertexts-per-value-column stride.
	pub fn pir_num_query_ciphertext(&self) -> usize {
		self.pir_num_query_ciphertext
	}

	/// The number of squarings the equality check applies, satisfying
	/// `2^squarings = t - 1`.
	pub fn squarings(&self) -> u32 {
		self.squarings
	}

	/// The shared SEAL context built from these parameters.
	pub fn context(&self) -> &Context {
		&self.context
	}

	/// The underlying SEAL encryption parameters.
	pub fn encryption_parameters(&self) -> &EncryptionParameters {
		&self.enc_params
	}

	/// Half the polynomial modulus degree, `N/2`: the number of CRT slots
	/// per matrix row.
	pub fn half_degree(&self) -> u64 {
		self.poly_modulus_degree / 2
	}

	/// The Galois rotation steps the client must generate keys for (§4.1):
	/// `{0}`, the powers of two from `N/(2·NUM_COL)` up to `N/4` used by
	/// `QueryExpand`'s replicate loop, the negative powers of two from
	/// `-1` up to `-(pir_num_columns_per_obj/2 - 1)` used by `Process2`'s
	/// per-column packing tree, and `-(obj_size_bytes/4)` used by
	/// `Process2`'s cross-shard packing.
	pub fn galois_steps(&self) -> Vec<i32> {
		let mut steps = vec![0i32];

		let mut step = self.poly_modulus_degree / (2 * self.num_col as u64);
		let quarter = self.poly_modulus_degree / 4;
		while step <= quarter {
			steps.push(step as i32);
			step *= 2;
		}

		let max_neg = (self.pir_num_columns_per_obj / 2).saturating_sub(1) as i64;
		let mut neg = 1i64;
		while neg <= max_neg {
			steps.push(-(neg as i32));
			neg *= 2;
		}

		let obj_quarter = (self.obj_size_bytes / 4).max(1) as i32;
		steps.push(-obj_quarter);

		steps
	}
}

/// Builds a [`Parameters`] contract, validating every invariant named in
/// §3/§4.1/§9 before handing back a usable value.
pub struct ParametersBuilder {
	n: Option<usize>,
	key_size_bits: Option<usize>,
	obj_size_bytes: Option<usize>,
	poly_modulus_degree: u64,
	plain_modulus: u64,
	modulus_switch_depth: usize,
	security_level: SecurityLevel,
}

impl Default for ParametersBuilder {
	fn default() -> Self {
		Self {
			n: None,
			key_size_bits: None,
			obj_size_bytes: None,
			poly_modulus_degree: 32_768,
			plain_modulus: DEFAULT_PLAIN_MODULUS,
			modulus_switch_depth: 9,
			security_level: SecurityLevel::Tc128,
		}
	}
}

impl ParametersBuilder {
	/// Starts a new builder with the reference defaults (`N = 32768`,
	/// `t = 65537`, `D_ms = 9`, 128-bit security).
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `n`, the number of (key, value) pairs the table will hold.
	pub fn set_item_count(mut self, n: usize) -> Self {
		self.n = Some(n);
		self
	}

	/// Sets the keyword width in bits.
	pub fn set_key_size_bits(mut self, bits: usize) -> Self {
		self.key_size_bits = Some(bits);
		self
	}

	/// Sets the value width in bytes.
	pub fn set_obj_size_bytes(mut self, bytes: usize) -> Self {
		self.obj_size_bytes = Some(bytes);
		self
	}

	/// Overrides `N`, the polynomial modulus degree. Must be a power of
	/// two.
	pub fn set_poly_modulus_degree(mut self, degree: u64) -> Self {
		self.poly_modulus_degree = degree;
		self
	}

	/// Overrides `t`, the plaintext modulus. Must satisfy
	/// `2^k = t - 1` for some `k`; the equality-check fingerprint depends
	/// on it.
	pub fn set_plain_modulus(mut self, modulus: u64) -> Self {
		self.plain_modulus = modulus;
		self
	}

	/// Overrides `D_ms`, the modulus-switch depth.
	pub fn set_modulus_switch_depth(mut self, depth: usize) -> Self {
		self.modulus_switch_depth = depth;
		self
	}

	/// Overrides the target security level. Defaults to 128-bit.
	pub fn set_security_level(mut self, level: SecurityLevel) -> Self {
		self.security_level = level;
		self
	}

	/// Validates the accumulated fields and builds the contract.
	pub fn build(self) -> Result<Parameters> {
		let n = self
			.n
			.ok_or_else(|| Error::InvalidParams("item count not set".into()))?;
		let key_size_bits = self
			.key_size_bits
			.ok_or_else(|| Error::InvalidParams("key size not set".into()))?;
		let obj_size_bytes = self
			.obj_size_bytes
			.ok_or_else(|| Error::InvalidParams("object size not set".into()))?;

		if !self.poly_modulus_degree.is_power_of_two() {
			return Err(Error::InvalidParams(
				"poly_modulus_degree must be a power of two".into(),
			));
		}

		let squarings = (self.plain_modulus - 1).trailing_zeros();
		if 1u64.checked_shl(squarings).unwrap_or(0) != self.plain_modulus - 1 {
			return Err(Error::InvalidParams(format!(
				"plain modulus {} does not satisfy 2^k = t - 1",
				self.plain_modulus
			)));
		}

		let num_col = fingerprint::num_columns(key_size_bits);
		if num_col == 0 {
			return Err(Error::InvalidParams("key size must be nonzero".into()));
		}

		let half_degree = self.poly_modulus_degree / 2;
		let num_row = n.div_ceil(half_degree as usize);

		let bits_per_half_obj = (obj_size_bytes / 2) * 8;
		let pir_num_columns_per_obj =
			2 * bits_per_half_obj.div_ceil(fingerprint::PLAIN_BIT as usize);

		if (obj_size_bytes / 4) as u64 > half_degree {
			return Err(Error::InvalidParams(
				"obj_size / 4 must not exceed N / 2 (cross-shard packing precondition)".into(),
			));
		}

		let pir_db_rows =
			n.div_ceil(self.poly_modulus_degree as usize) * pir_num_columns_per_obj;
		let pir_num_query_ciphertext = n.div_ceil(half_degree as usize);

		let coefficient_modulus =
			CoefficientModulus::bfv_default(self.poly_modulus_degree, self.security_level)?;

		if coefficient_modulus.len() <= self.modulus_switch_depth {
			return Err(Error::InvalidParams(format!(
				"coefficient modulus chain of length {} cannot absorb {} modulus switches",
				coefficient_modulus.len(),
				self.modulus_switch_depth
			)));
		}

		let enc_params = BfvEncryptionParametersBuilder::new()
			.set_poly_modulus_degree(self.poly_modulus_degree)
			.set_coefficient_modulus(coefficient_modulus)
			.set_plain_modulus_constant(self.plain_modulus)
			.build()?;

		let context = Context::new(&enc_params, true, self.security_level)?;

		Ok(Parameters {
			n,
			key_size_bits,
			obj_size_bytes,
			poly_modulus_degree: self.poly_modulus_degree,
			plain_modulus: self.plain_modulus,
			modulus_switch_depth: self.modulus_switch_depth,
			num_col,
			num_row,
			pir_num_columns_per_obj,
			pir_db_rows,
			pir_num_query_ciphertext,
			squarings,
			context,
			enc_params,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn derives_expected_squaring_count() {
		let params = ParametersBuilder::new()
			.set_item_count(1000)
			.set_key_size_bits(64)
			.set_obj_size_bytes(32)
			.set_poly_modulus_degree(8192)
			.build()
			.unwrap();

		assert_eq!(params.squarings(), 16);
		assert_eq!(params.num_col(), 2);
	}

	#[test]
	fn rejects_non_fermat_plain_modulus() {
		let result = ParametersBuilder::new()
			.set_item_count(1000)
			.set_key_size_bits(64)
			.set_obj_size_bytes(32)
			.set_poly_modulus_degree(8192)
			.set_plain_modulus(12289)
			.build();

		assert!(matches!(result, Err(Error::InvalidParams(_))));
	}

	#[test]
	fn galois_steps_include_zero_and_negatives() {
		let params = ParametersBuilder::new()
			.set_item_count(1000)
			.set_key_size_bits(64)
			.set_obj_size_bytes(32)
			.set_poly_modulus_degree(8192)
			.build()
			.unwrap();

		let steps = params.galois_steps();

		assert_eq!(steps[0], 0);
		assert!(steps.iter().any(|&s| s < 0));
	}
}
