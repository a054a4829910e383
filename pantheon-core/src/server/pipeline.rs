use pantheon_crypto::threaded;
use pantheon_crypto::Parameters;
use pantheon_seal::encoder::Encoder;
use pantheon_seal::{
	BatchEncoder, BfvEvaluator, Ciphertext, Evaluator, GaloisKeys, Plaintext, RelinearizationKeys,
};
use tracing::instrument;

use super::ServerContext;
use crate::error::Result;

/// `QueryExpand` (§4.4 Stage 1): builds one mask per fingerprint column,
/// dyadic-multiplies the query ciphertext against it, then replicates the
/// matched slot block across the whole half-row by repeated
/// rotate-and-add.
#[instrument(skip(evaluator, encoder, query_ciphertext, galois_keys))]
pub fn query_expand(
	evaluator: &BfvEvaluator,
	encoder: &BatchEncoder,
	params: &Parameters,
	query_ciphertext: &Ciphertext,
	galois_keys: &GaloisKeys,
	max_workers: usize,
) -> Result<Vec<Ciphertext>> {
	let half_degree = params.half_degree() as usize;
	let num_col = params.num_col();
	let block = half_degree / num_col;

	let masks = build_column_masks(encoder, evaluator, params, half_degree, num_col, block)?;

	let mut query_ntt = query_ciphertext.clone();
	evaluator.transform_to_ntt_inplace(&mut query_ntt)?;

	let work: Vec<(Ciphertext, Plaintext)> = masks
		.into_iter()
		.map(|mask| (query_ntt.clone(), mask))
		.collect();

	let products = threaded::multiply_plain_batch(evaluator, &work, max_workers)?;

	let mut columns = Vec::with_capacity(num_col);
	for product in products {
		let mut eq = product;
		evaluator.transform_from_ntt_inplace(&mut eq)?;

		let mut step = (half_degree / num_col) as u64;
		let quarter = params.poly_modulus_degree() / 4;
		while step <= quarter {
			let rotated = evaluator.rotate_rows(&eq, step as i32, galois_keys)?;
			evaluator.add_inplace(&mut eq, &rotated)?;
			step *= 2;
		}

		columns.push(eq);
	}

	Ok(columns)
}

fn build_column_masks(
	encoder: &BatchEncoder,
	evaluator: &BfvEvaluator,
	params: &Parameters,
	half_degree: usize,
	num_col: usize,
	block: usize,
) -> Result<Vec<Plaintext>> {
	let mut masks = Vec::with_capacity(num_col);

	for c in 0..num_col {
		let mut slots = vec![0u64; 2 * half_degree];
		for slot in c * block..(c + 1) * block {
			slots[slot] = 1;
			slots[half_degree + slot] = 1;
		}

		let mut plaintext = encoder.encode(&slots)?;
		evaluator.transform_plaintext_to_ntt_inplace(&mut plaintext, params.context())?;
		masks.push(plaintext);
	}

	Ok(masks)
}

/// `Process1` (§4.4 Stage 2): the equality-check fingerprint test against
/// every shard's row batches, yielding one `row_selector[s][r]` ciphertext
/// per row batch.
#[instrument(skip(context, eq_columns, one_ciphertext, relin_keys, galois_keys))]
pub fn process1(
	context: &ServerContext,
	eq_columns: &[Ciphertext],
	one_ciphertext: &Ciphertext,
	relin_keys: &RelinearizationKeys,
	galois_keys: &GaloisKeys,
) -> Result<Vec<Vec<Ciphertext>>> {
	let evaluator = context.evaluator();
	let squarings = context.params().squarings();
	let modulus_switch_depth = context.params().modulus_switch_depth();

	let mut per_shard = Vec::with_capacity(context.num_shards());

	for s in 0..context.num_shards() {
		let db = context.shard(s);
		let mut row_selectors = Vec::with_capacity(db.num_row_batches());

		for r in 0..db.num_row_batches() {
			let col_results: Vec<Ciphertext> = (0..eq_columns.len())
				.map(|c| {
					let fp = db.fingerprint_plaintext(r, c);
					let mut sub = evaluator.sub_plain(&eq_columns[c], fp)?;

					for _ in 0..squarings {
						evaluator.square_inplace(&mut sub)?;
						evaluator.relinearize_inplace(&mut sub, relin_keys)?;
					}

					for _ in 0..modulus_switch_depth {
						evaluator.mod_switch_to_next_inplace(&mut sub)?;
					}

					evaluator.sub(one_ciphertext, &sub)
				})
				.collect::<pantheon_seal::Result<Vec<_>>>()
				.map_err(pantheon_crypto::Error::from)?;

			let mut reduced = evaluator.multiply_many(&col_results, relin_keys)?;

			let swapped = evaluator.rotate_columns(&reduced, galois_keys)?;
			evaluator.multiply_inplace(&mut reduced, &swapped)?;
			evaluator.relinearize_inplace(&mut reduced, relin_keys)?;
			evaluator.transform_to_ntt_inplace(&mut reduced)?;

			row_selectors.push(reduced);
		}

		per_shard.push(row_selectors);
	}

	Ok(per_shard)
}

/// `Process2` (§4.4 Stage 3): extracts the selected value from every
/// shard's value plaintexts via `row_selector`, then packs the `M` shard
/// answers into a cumulative cross-shard stream.
///
/// Each value column is summed independently, then the per-shard columns
/// are merged by [`pack_value_columns`]'s rotate-and-add tree so column
/// `j` lands at slot offset `+j` rather than overlapping at offset zero.
#[instrument(skip(context, row_selectors, galois_keys))]
pub fn process2(
	context: &ServerContext,
	row_selectors: &[Vec<Ciphertext>],
	galois_keys: &GaloisKeys,
) -> Result<Vec<Ciphertext>> {
	let evaluator = context.evaluator();
	let params = context.params();
	let stride = params.pir_num_query_ciphertext();
	let num_value_columns = params.pir_num_columns_per_obj() / 2;

	let mut shard_answers = Vec::with_capacity(context.num_shards());

	for s in 0..context.num_shards() {
		let db = context.shard(s);
		let selectors = &row_selectors[s];

		let mut columns = Vec::with_capacity(num_value_columns);
		for j in 0..num_value_columns {
			let mut acc: Option<Ciphertext> = None;

			for (r, selector) in selectors.iter().enumerate() {
				let value_row = j * stride + r;
				if value_row >= params.pir_db_rows() {
					continue;
				}
				let term = evaluator.multiply_plain(selector, db.value_plaintext(value_row))?;
				acc = Some(match acc {
					Some(prev) => evaluator.add(&prev, &term)?,
					None => term,
				});
			}

			let mut column_sum = acc.ok_or_else(|| {
				pantheon_crypto::Error::InvalidParams("shard produced no rows for a value column".into())
			})?;
			evaluator.transform_from_ntt_inplace(&mut column_sum)?;
			columns.push(column_sum);
		}

		shard_answers.push(pack_value_columns(evaluator, &columns, galois_keys)?);
	}

	pack_cross_shard(evaluator, params, &shard_answers, galois_keys)
}

/// `get_sum`'s divide-and-conquer merge: splits `columns` at the next
/// power of two's midpoint, recurses on each half, then rotates the right
/// half's result by `-mid` (a registered power-of-two Galois step) before
/// folding it into the left half. Leaves every column's single nonzero
/// slot exactly `j` positions to the right of where it started.
fn pack_value_columns(
	evaluator: &BfvEvaluator,
	columns: &[Ciphertext],
	galois_keys: &GaloisKeys,
) -> Result<Ciphertext> {
	if columns.len() == 1 {
		return Ok(columns[0].clone());
	}

	let mid = columns.len().next_power_of_two() / 2;
	let left = pack_value_columns(evaluator, &columns[..mid], galois_keys)?;
	let right = pack_value_columns(evaluator, &columns[mid..], galois_keys)?;
	let shifted = evaluator.rotate_rows(&right, -(mid as i32), galois_keys)?;

	Ok(evaluator.add(&left, &shifted)?)
}

/// Folds the `M` per-shard answers into a single cumulative stream: at
/// each step the running total is rotated right by an object-quarter
/// before the next shard's (unrotated) answer is added in, so every
/// newly-folded shard's own contribution sits at its own row's natural
/// slot offset within that stream position.
fn pack_cross_shard(
	evaluator: &BfvEvaluator,
	params: &Parameters,
	shard_answers: &[Ciphertext],
	galois_keys: &GaloisKeys,
) -> Result<Vec<Ciphertext>> {
	let quarter = (params.obj_size_bytes() / 4).max(1);
	let mut stream = Vec::with_capacity(shard_answers.len());

	let mut running = shard_answers[0].clone();
	stream.push(running.clone());

	for answer in shard_answers.iter().skip(1) {
		running = evaluator.rotate_rows(&running, -(quarter as i32), galois_keys)?;
		evaluator.add_inplace(&mut running, answer)?;
		stream.push(running.clone());
	}

	Ok(stream)
}
