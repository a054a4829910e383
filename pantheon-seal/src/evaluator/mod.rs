use crate::error::Result;

mod bfv;
pub use bfv::BfvEvaluator;

/// Homomorphic operations over BFV ciphertexts and plaintexts.
///
/// This is the API surface the threaded batched primitives in
/// `pantheon-crypto` are built on top of: each method here is a single
/// SEAL call, and `pantheon-crypto` is responsible for fanning independent
/// calls out across worker threads. Nothing in this trait is itself
/// internally parallel.
pub trait Evaluator {
	/// The plaintext type this evaluator's plain-* methods accept.
	type Plaintext;
	/// The ciphertext type this evaluator operates on.
	type Ciphertext;

	/// Negates `a` in place.
	fn negate_inplace(&self, a: &mut Self::Ciphertext) -> Result<()>;
	/// Returns `-a`.
	fn negate(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext>;

	/// Adds `b` into `a` in place.
	fn add_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Ciphertext) -> Result<()>;
	/// Returns `a + b`.
	fn add(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;
	/// Returns the sum of every ciphertext in `a`. Used by the column-tree
	/// reduction in the equality-check stage.
	fn add_many(&self, a: &[Self::Ciphertext]) -> Result<Self::Ciphertext>;

	/// Subtracts `b` from `a` in place.
	fn sub_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Ciphertext) -> Result<()>;
	/// Returns `a - b`.
	fn sub(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

	/// Multiplies `b` into `a` in place. Doubles `a`'s polynomial count;
	/// callers must relinearize before a second multiplication.
	fn multiply_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Ciphertext) -> Result<()>;
	/// Returns `a * b`.
	fn multiply(&self, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;
	/// Returns the product of every ciphertext in `a`, relinearizing after
	/// each multiplication. Used by the column-tree reduction.
	fn multiply_many(
		&self,
		a: &[Self::Ciphertext],
		relin_keys: &crate::RelinearizationKeys,
	) -> Result<Self::Ciphertext>;

	/// Squares `a` in place.
	fn square_inplace(&self, a: &mut Self::Ciphertext) -> Result<()>;
	/// Returns `a * a`.
	fn square(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext>;

	/// Repeatedly squares and relinearizes `a` `exponent`'s bit length worth
	/// of times to compute `a^exponent`. The equality-check fingerprint uses
	/// this with `exponent = t - 1` so that, by Fermat's little theorem,
	/// `a^(t-1) = 1` exactly when `a != 0 (mod t)`.
	fn exponentiate_inplace(
		&self,
		a: &mut Self::Ciphertext,
		exponent: u64,
		relin_keys: &crate::RelinearizationKeys,
	) -> Result<()>;
	/// Returns `a^exponent`.
	fn exponentiate(
		&self,
		a: &Self::Ciphertext,
		exponent: u64,
		relin_keys: &crate::RelinearizationKeys,
	) -> Result<Self::Ciphertext>;

	/// Relinearizes `a` in place, collapsing it back to two polynomials
	/// after a multiplication.
	fn relinearize_inplace(
		&self,
		a: &mut Self::Ciphertext,
		relin_keys: &crate::RelinearizationKeys,
	) -> Result<()>;
	/// Returns a relinearized copy of `a`.
	fn relinearize(
		&self,
		a: &Self::Ciphertext,
		relin_keys: &crate::RelinearizationKeys,
	) -> Result<Self::Ciphertext>;

	/// Switches `a` down to the next modulus in the chain in place,
	/// dropping one RNS component.
	fn mod_switch_to_next_inplace(&self, a: &mut Self::Ciphertext) -> Result<()>;
	/// Returns `a` switched down to the next modulus.
	fn mod_switch_to_next(&self, a: &Self::Ciphertext) -> Result<Self::Ciphertext>;

	/// Adds plaintext `b` into ciphertext `a` in place.
	fn add_plain_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Plaintext) -> Result<()>;
	/// Returns `a + b`.
	fn add_plain(&self, a: &Self::Ciphertext, b: &Self::Plaintext) -> Result<Self::Ciphertext>;

	/// Subtracts plaintext `b` from ciphertext `a` in place.
	fn sub_plain_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Plaintext) -> Result<()>;
	/// Returns `a - b`.
	fn sub_plain(&self, a: &Self::Ciphertext, b: &Self::Plaintext) -> Result<Self::Ciphertext>;

	/// Multiplies ciphertext `a` by plaintext `b` in place. The one-hot
	/// selector application in `Process2` is built entirely out of this.
	fn multiply_plain_inplace(&self, a: &mut Self::Ciphertext, b: &Self::Plaintext) -> Result<()>;
	/// Returns `a * b`.
	fn multiply_plain(&self, a: &Self::Ciphertext, b: &Self::Plaintext) -> Result<Self::Ciphertext>;

	/// Rotates the batched slots of each matrix row left by `steps` in
	/// place.
	fn rotate_rows_inplace(
		&self,
		a: &mut Self::Ciphertext,
		steps: i32,
		galois_keys: &crate::GaloisKeys,
	) -> Result<()>;
	/// Returns `a` with its rows rotated left by `steps`.
	fn rotate_rows(
		&self,
		a: &Self::Ciphertext,
		steps: i32,
		galois_keys: &crate::GaloisKeys,
	) -> Result<Self::Ciphertext>;

	/// Swaps the two matrix rows of `a` in place (conjugation in the
	/// plaintext slot domain). The equality-check fingerprint's conjugate
	/// fold step uses this to combine a ciphertext with its row-swapped
	/// self.
	fn rotate_columns_inplace(&self, a: &mut Self::Ciphertext, galois_keys: &crate::GaloisKeys) -> Result<()>;
	/// Returns `a` with its two matrix rows swapped.
	fn rotate_columns(&self, a: &Self::Ciphertext, galois_keys: &crate::GaloisKeys) -> Result<Self::Ciphertext>;

	/// Transforms `a` into NTT (evaluation) form in place.
	fn transform_to_ntt_inplace(&self, a: &mut Self::Ciphertext) -> Result<()>;
	/// Transforms `a` out of NTT form and back to coefficient form in
	/// place.
	fn transform_from_ntt_inplace(&self, a: &mut Self::Ciphertext) -> Result<()>;

	/// Transforms plaintext `a` into NTT form in place, against the
	/// top-of-chain `parms_id` of `context`. The database encoder transforms
	/// every fingerprint and value plaintext this way once at load time, so
	/// the per-query `multiply_plain` calls in the equality-check and
	/// extraction stages never pay for it.
	fn transform_plaintext_to_ntt_inplace(
		&self,
		a: &mut Self::Plaintext,
		context: &crate::Context,
	) -> Result<()>;
	/// Transforms plaintext `a` out of NTT form in place.
	fn transform_plaintext_from_ntt_inplace(&self, a: &mut Self::Plaintext) -> Result<()>;
}
