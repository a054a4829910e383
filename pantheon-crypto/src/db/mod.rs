mod pareto;

pub use pareto::{sample_frequencies, MultiMapDatabase, ParetoParams};

use pantheon_seal::encoder::Encoder;
use pantheon_seal::{BatchEncoder, Evaluator, Plaintext};

use crate::error::Result;
use crate::fingerprint;
use crate::parameters::Parameters;

/// The sentinel stored in an unused key slot. Real keys are assigned
/// positive ids starting at `1`.
pub const INVALID_KEY: u64 = 0;

/// The sentinel `ResolveIndex` returns for a shard that doesn't contain the
/// queried key.
pub const INVALID_INDEX: i64 = -1;

/// One key-unique table: a single instance of the database layout
/// described in §3/§4.2. A non-multimap deployment is exactly one of
/// these; a multimap deployment is `M` of them (see [`MultiMapDatabase`]).
pub struct Database {
	/// Slot `i` holds the id of the key stored at logical row `i`, or
	/// [`INVALID_KEY`].
	keys: Vec<u64>,
	/// `fingerprints[row_batch][col]`, NTT-domain.
	fingerprints: Vec<Vec<Plaintext>>,
	/// `values[row]`, NTT-domain, length `pir_db_rows`.
	values: Vec<Plaintext>,
}

impl Database {
	/// Allocates an empty database sized for `params`, with every key slot
	/// set to [`INVALID_KEY`].
	pub fn empty(params: &Parameters) -> Self {
		let half_degree = params.half_degree() as usize;

		Self {
			keys: vec![INVALID_KEY; params.num_row() * half_degree],
			fingerprints: Vec::with_capacity(params.num_row()),
			values: Vec::new(),
		}
	}

	/// Returns the key id stored at logical row `row`, or [`INVALID_KEY`].
	pub fn key_at(&self, row: usize) -> u64 {
		self.keys.get(row).copied().unwrap_or(INVALID_KEY)
	}

	/// `FP[row_batch][col]`.
	pub fn fingerprint_plaintext(&self, row_batch: usize, col: usize) -> &Plaintext {
		&self.fingerprints[row_batch][col]
	}

	/// `V[row]`.
	pub fn value_plaintext(&self, row: usize) -> &Plaintext {
		&self.values[row]
	}

	/// Number of fingerprint row-batches.
	pub fn num_row_batches(&self) -> usize {
		self.fingerprints.len()
	}

	/// `PopulateKeys`: assigns each row a key id (index into `keys`, 1-based
	/// so `0` stays reserved for [`INVALID_KEY`]) and builds `FP[r][c]` by
	/// hashing each key into its fingerprint pair, batch-encoding the
	/// resulting per-column slot vectors, and transforming them to NTT
	/// form.
	pub fn populate_keys(
		&mut self,
		params: &Parameters,
		raw_keys: &[Vec<u8>],
		encoder: &BatchEncoder,
		evaluator: &impl Evaluator<Plaintext = Plaintext>,
		context: &pantheon_seal::Context,
	) -> Result<()> {
		let half_degree = params.half_degree() as usize;
		let num_col = params.num_col();

		self.keys = vec![INVALID_KEY; params.num_row() * half_degree];
		for (i, key) in raw_keys.iter().enumerate() {
			if i >= self.keys.len() {
				break;
			}
			self.keys[i] = (i + 1) as u64;
			let _ = key;
		}

		self.fingerprints = Vec::with_capacity(params.num_row());

		for row_batch in 0..params.num_row() {
			let mut columns = Vec::with_capacity(num_col);

			for c in 0..num_col {
				let mut slots = vec![0u64; 2 * half_degree];

				for slot in 0..half_degree {
					let row = row_batch * half_degree + slot;
					let Some(key) = raw_keys.get(row) else {
						continue;
					};

					let fp = fingerprint::fingerprint(key, num_col);
					let (lower, upper) = fp[c];
					slots[slot] = lower as u64;
					slots[half_degree + slot] = upper as u64;
				}

				let mut plaintext = encoder.encode(&slots)?;
				evaluator.transform_plaintext_to_ntt_inplace(&mut plaintext, context)?;
				columns.push(plaintext);
			}

			self.fingerprints.push(columns);
		}

		Ok(())
	}

	/// `PopulateValues`: packs each value's bytes into 16-bit slot chunks
	/// and writes `pir_db_rows` NTT-domain plaintexts, leaving unused slots
	/// at `1` so the PIR sum reduces to the selected row exactly.
	pub fn populate_values(
		&mut self,
		params: &Parameters,
		raw_values: &[Vec<u8>],
		encoder: &BatchEncoder,
		evaluator: &impl Evaluator<Plaintext = Plaintext>,
		context: &pantheon_seal::Context,
	) -> Result<()> {
		let half_degree = params.half_degree() as usize;
		let stride = params.pir_num_query_ciphertext();
		let half_cols = params.pir_num_columns_per_obj() / 2;

		let mut rows: Vec<Vec<u64>> = vec![vec![1u64; 2 * half_degree]; params.pir_db_rows()];

		for (i, value) in raw_values.iter().enumerate() {
			let chunks = pack_value_chunks(value, half_cols);
			let dest_row_group = i / half_degree;
			let dest_slot = i % half_degree;

			for (j, &(lower, upper)) in chunks.iter().enumerate() {
				let dest = j * stride + dest_row_group;
				if dest >= rows.len() {
					continue;
				}
				rows[dest][dest_slot] = lower as u64;
				rows[dest][half_degree + dest_slot] = upper as u64;
			}
		}

		self.values = Vec::with_capacity(rows.len());
		for slots in rows {
			let mut plaintext = encoder.encode(&slots)?;
			evaluator.transform_plaintext_to_ntt_inplace(&mut plaintext, context)?;
			self.values.push(plaintext);
		}

		Ok(())
	}

	/// `ResolveIndex`: a linear scan for `key`'s fingerprint among the
	/// populated rows, returning the matching logical row index or
	/// [`INVALID_INDEX`].
	///
	/// One index is produced per call, pushed only after the scan
	/// completes (§9's first Open Question): never pushed redundantly
	/// inside the loop body.
	pub fn resolve_index(&self, raw_keys: &[Vec<u8>], target: &[u8]) -> i64 {
		for (row, key) in raw_keys.iter().enumerate() {
			if self.key_at(row) == INVALID_KEY {
				continue;
			}
			if key.as_slice() == target {
				return row as i64;
			}
		}

		INVALID_INDEX
	}
}

/// Packs `value` into `half_cols` `(lower, upper)` 16-bit chunk pairs: the
/// first half of `value`'s bytes feed the `lower`/row-0 chunks, the second
/// half feed `upper`/row-1.
fn pack_value_chunks(value: &[u8], half_cols: usize) -> Vec<(u16, u16)> {
	let half_len = value.len() / 2;
	let (first, second) = value.split_at(half_len);

	(0..half_cols)
		.map(|j| {
			let lower = read_u16_chunk(first, j);
			let upper = read_u16_chunk(second, j);
			(lower, upper)
		})
		.collect()
}

fn read_u16_chunk(bytes: &[u8], chunk_index: usize) -> u16 {
	let base = chunk_index * 2;
	let hi = bytes.get(base).copied().unwrap_or(0);
	let lo = bytes.get(base + 1).copied().unwrap_or(0);
	u16::from_be_bytes([hi, lo])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pack_value_chunks_round_trips_bytes() {
		let value = b"dhsncjskfnxasdjwwwww".to_vec();
		let chunks = pack_value_chunks(&value, value.len() / 4 + 1);

		assert!(!chunks.is_empty());
	}
}
