use pantheon_seal::encoder::Encoder;
use pantheon_seal::{BatchEncoder, Context, Evaluator, Plaintext};
use rand::Rng;
use rand_distr::Distribution;

use crate::db::Database;
use crate::error::Result;
use crate::parameters::Parameters;

/// Shape parameters for the discrete Pareto distribution `PopulatePareto`
/// draws each keyword's replica count from.
#[derive(Debug, Clone, Copy)]
pub struct ParetoParams {
	/// The distribution's scale, `x_m`: the minimum number of shards any
	/// keyword is replicated into.
	pub scale: f64,
	/// The distribution's shape, `alpha`: larger values concentrate more
	/// mass near `scale`, giving a less skewed replica count.
	pub shape: f64,
	/// The hard ceiling on replica count, independent of the sampled
	/// value — no keyword is ever placed into more shards than exist.
	pub max_replicas: usize,
}

impl Default for ParetoParams {
	fn default() -> Self {
		Self {
			scale: 1.0,
			shape: 1.5,
			max_replicas: 4,
		}
	}
}

/// Draws one replica count per entry in `keys`, via the discrete Pareto
/// recipe: sample continuous Pareto(`scale`, `shape`), round up, clamp to
/// `[1, max_replicas]`.
pub fn sample_frequencies(
	keys: &[Vec<u8>],
	params: &ParetoParams,
	rng: &mut impl Rng,
) -> Result<Vec<usize>> {
	let dist = rand_distr::Pareto::new(params.scale, params.shape)
		.map_err(|e| crate::error::Error::InvalidParams(e.to_string()))?;

	Ok(keys
		.iter()
		.map(|_| {
			let sample = dist.sample(rng).ceil() as usize;
			sample.clamp(1, params.max_replicas.max(1))
		})
		.collect())
}

/// A Pareto-sharded multi-map database: `M` independent [`Database`]
/// instances, each holding a subset of the (key, value) pairs, with
/// skewed keywords replicated across more shards than uniform ones.
///
/// `ResolveIndex` runs once per shard; a client queries every shard and
/// discards the shards that report [`super::INVALID_INDEX`].
pub struct MultiMapDatabase {
	shards: Vec<Database>,
	/// `placement[key_index]` lists the shard ids that key was placed into,
	/// in round-robin assignment order.
	placement: Vec<Vec<usize>>,
}

impl MultiMapDatabase {
	/// `PopulatePareto` + `PopulateKeys` + `PopulateValues`: samples each
	/// key's replica count, assigns replicas to shards round-robin
	/// starting from a rotating offset (so no single shard absorbs every
	/// high-frequency key), then populates each shard's fingerprint and
	/// value plaintexts independently.
	pub fn build(
		params: &Parameters,
		num_shards: usize,
		keys: &[Vec<u8>],
		values: &[Vec<u8>],
		pareto: &ParetoParams,
		rng: &mut impl Rng,
		encoder: &BatchEncoder,
		evaluator: &impl Evaluator<Plaintext = Plaintext>,
		context: &Context,
	) -> Result<Self> {
		assert_eq!(keys.len(), values.len(), "keys and values must pair up");

		let frequencies = sample_frequencies(keys, pareto, rng)?;
		let mut shard_keys: Vec<Vec<Vec<u8>>> = vec![Vec::new(); num_shards];
		let mut shard_values: Vec<Vec<Vec<u8>>> = vec![Vec::new(); num_shards];
		let mut placement: Vec<Vec<usize>> = Vec::with_capacity(keys.len());

		let mut cursor = 0usize;
		for (i, key) in keys.iter().enumerate() {
			let replicas = frequencies[i].min(num_shards);
			let mut assigned = Vec::with_capacity(replicas);

			for r in 0..replicas {
				let shard = (cursor + r) % num_shards;
				shard_keys[shard].push(key.clone());
				shard_values[shard].push(values[i].clone());
				assigned.push(shard);
			}

			placement.push(assigned);
			cursor = (cursor + 1) % num_shards;
		}

		let mut shards = Vec::with_capacity(num_shards);
		for shard_index in 0..num_shards {
			let mut db = Database::empty(params);
			db.populate_keys(params, &shard_keys[shard_index], encoder, evaluator, context)?;
			db.populate_values(params, &shard_values[shard_index], encoder, evaluator, context)?;
			shards.push(db);
		}

		Ok(Self { shards, placement })
	}

	/// The number of shards this database is split across.
	pub fn num_shards(&self) -> usize {
		self.shards.len()
	}

	/// Borrows shard `index`.
	pub fn shard(&self, index: usize) -> &Database {
		&self.shards[index]
	}

	/// `ResolveIndex` run against every shard: per the first Open Question
	/// decision, each shard contributes exactly one entry to the returned
	/// vector, `INVALID_INDEX` when that shard doesn't hold the key.
	pub fn resolve_all(&self, raw_keys_per_shard: &[Vec<Vec<u8>>], target: &[u8]) -> Vec<i64> {
		self.shards
			.iter()
			.zip(raw_keys_per_shard.iter())
			.map(|(shard, raw_keys)| shard.resolve_index(raw_keys, target))
			.collect()
	}

	/// The shard ids a given input key index (as passed to [`Self::build`])
	/// was replicated into.
	pub fn placement_of(&self, key_index: usize) -> &[usize] {
		&self.placement[key_index]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;

	#[test]
	fn frequencies_respect_clamp() {
		let params = ParetoParams {
			scale: 1.0,
			shape: 1.5,
			max_replicas: 3,
		};
		let keys: Vec<Vec<u8>> = (0..50).map(|i: u32| i.to_be_bytes().to_vec()).collect();
		let mut rng = rand::rngs::StdRng::seed_from_u64(7);

		let frequencies = sample_frequencies(&keys, &params, &mut rng).unwrap();

		assert_eq!(frequencies.len(), keys.len());
		assert!(frequencies.iter().all(|&f| (1..=3).contains(&f)));
	}
}
