use pantheon_crypto::{fingerprint, Parameters, ParametersBuilder, INVALID_INDEX};
use pantheon_seal::encoder::Encoder;
use pantheon_seal::{
	AsymmetricEncryptor, BatchEncoder, BfvEvaluator, Ciphertext, Decryptor, Encryptor, Evaluator,
	GaloisKeys, KeyGenerator, RelinearizationKeys, SymAsym, SymmetricEncryptor, ToBytes,
};
use tracing::instrument;

use crate::error::Result;

/// The client half of a query session: holds the secret key (never
/// serialized) plus the derived relinearization/Galois keys, and exposes
/// `QueryMake`/`Reconstruct` against a fixed [`Parameters`] contract.
///
/// Reusable across many query round trips against the same server session
/// (§4.3's setup/session lifecycle).
pub struct Client {
	params: Parameters,
	encoder: BatchEncoder,
	encryptor: Encryptor<SymAsym>,
	decryptor: Decryptor,
	relin_keys: RelinearizationKeys,
	galois_keys: GaloisKeys,
	one_ciphertext: Ciphertext,
}

impl Client {
	/// `Client::setup`: loads `P`, runs `KeyGenerator` to produce the
	/// secret key (retained only in memory), relinearization keys, and the
	/// Galois key set the shared contract names.
	#[instrument(skip(params))]
	pub fn setup(params: Parameters) -> Result<Self> {
		let context = params.context().clone();
		let keygen = KeyGenerator::new(&context)?;
		let public_key = keygen.create_public_key()?;
		let secret_key = keygen.secret_key();

		let encoder = BatchEncoder::new(&context)?;
		let encryptor =
			Encryptor::<SymAsym>::with_public_and_secret_key(&context, &public_key, &secret_key)?;
		let decryptor = Decryptor::new(&context, &secret_key)?;
		let relin_keys = keygen.create_relinearization_keys()?;
		let galois_keys = keygen.create_galois_keys_for_steps(&params.galois_steps())?;

		let one_plain = encoder.encode(&vec![1u64; params.poly_modulus_degree() as usize])?;
		let mut one_ciphertext = encryptor.encrypt_symmetric(&one_plain)?;

		// `process1`'s `sub` operand is mod-switched the same number of times
		// before the subtraction; `Evaluator::sub` requires matching `parms_id`.
		// Mirrors `PIRClient::SetOneCiphertext`.
		let evaluator = BfvEvaluator::new(&context)?;
		for _ in 0..params.modulus_switch_depth() {
			evaluator.mod_switch_to_next_inplace(&mut one_ciphertext)?;
		}

		Ok(Self {
			params,
			encoder,
			encryptor,
			decryptor,
			relin_keys,
			galois_keys,
			one_ciphertext,
		})
	}

	/// `Client::setup`, rebuilding `P` from `ReceiveParams`'s wire reply:
	/// `ParametersBuilder` is a pure function of these raw inputs, so a
	/// client that received the same `item_count`/`key_size_bits`/
	/// `obj_size_bytes`/`poly_modulus_degree`/`plain_modulus`/
	/// `modulus_switch_depth` as the server derives an identical `Context`
	/// without any parameter bytes crossing the wire.
	pub fn setup_from_wire(wire: &crate::protocol::params::Parameters) -> Result<Self> {
		let params = ParametersBuilder::new()
			.set_item_count(wire.item_count as usize)
			.set_key_size_bits(wire.key_size_bits as usize)
			.set_obj_size_bytes(wire.obj_size_bytes as usize)
			.set_poly_modulus_degree(wire.poly_modulus_degree)
			.set_plain_modulus(wire.plain_modulus)
			.set_modulus_switch_depth(wire.modulus_switch_depth as usize)
			.build()?;

		Self::setup(params)
	}

	/// The serialized relinearization keys for `SendKeys`'s `KeyBundle`.
	pub fn relin_keys_bytes(&self) -> Result<Vec<u8>> {
		as_bytes(&self.relin_keys)
	}

	/// The serialized Galois keys for `SendKeys`'s `KeyBundle`.
	pub fn galois_keys_bytes(&self) -> Result<Vec<u8>> {
		as_bytes(&self.galois_keys)
	}

	/// `Client::one_ciphertext`: the serialized `one_ct` for
	/// `SendOneCiphertext`.
	pub fn one_ciphertext_bytes(&self) -> Result<Vec<u8>> {
		as_bytes(&self.one_ciphertext)
	}

	/// `QueryMake(target)`: hashes the target keyword, lays its fingerprint
	/// out across the slot ranges assigned to each column, batch-encodes
	/// and symmetric-encrypts the result.
	#[instrument(skip(self, target))]
	pub fn query_make(&self, target: &[u8]) -> Result<Ciphertext> {
		let half_degree = self.params.half_degree() as usize;
		let num_col = self.params.num_col();
		let block = half_degree / num_col;

		let fp = fingerprint::fingerprint(target, num_col);
		let mut slots = vec![0u64; 2 * half_degree];

		for (c, &(lower, upper)) in fp.iter().enumerate() {
			for slot in c * block..(c + 1) * block {
				slots[slot] = lower as u64;
				slots[half_degree + slot] = upper as u64;
			}
		}

		let plaintext = self.encoder.encode(&slots)?;
		Ok(self.encryptor.encrypt(&plaintext)?)
	}

	/// Exposes the parameter contract this client was built from.
	pub fn parameters(&self) -> &Parameters {
		&self.params
	}

	/// `Reconstruct(answer_stream, M, shard_indices)`: decrypts each
	/// shard's answer ciphertext, rotates by `shard_index mod (N/2)`, and
	/// slices out the stored value's bytes. A `shard_index` of
	/// [`INVALID_INDEX`] expects an all-zero answer.
	#[instrument(skip(self, answers, shard_indices))]
	pub fn reconstruct(&self, answers: &[Ciphertext], shard_indices: &[i64]) -> Result<Vec<u8>> {
		let half_degree = self.params.half_degree() as usize;
		let obj_quarter = self.params.obj_size_bytes() / 4;

		let mut out = vec![0u8; self.params.obj_size_bytes()];

		for (answer, &shard_index) in answers.iter().zip(shard_indices.iter()) {
			if shard_index == INVALID_INDEX {
				continue;
			}

			let plaintext = self.decryptor.decrypt(answer)?;
			let slots = self.encoder.decode(&plaintext)?;

			let offset = (shard_index as usize) % half_degree;
			for half in 0..2 {
				let base = half * half_degree;
				for i in 0..obj_quarter {
					let slot = base + (offset + i) % half_degree;
					let value = slots[slot];
					let bytes = (value as u16).to_be_bytes();
					let dest = half * (self.params.obj_size_bytes() / 2) + i * 2;
					if dest + 1 < out.len() {
						out[dest] = bytes[0];
						out[dest + 1] = bytes[1];
					}
				}
			}
		}

		Ok(out)
	}
}

fn as_bytes(value: &impl ToBytes) -> Result<Vec<u8>> {
	Ok(value.as_bytes()?)
}
