pub(crate) mod pipeline;

pub use pipeline::{process1, process2, query_expand};

use pantheon_crypto::{Database, MultiMapDatabase, Parameters};
use pantheon_seal::{BatchEncoder, BfvEvaluator};

/// The per-instance value type replacing the original server's process-wide
/// globals (§9): everything a request handler needs is read-only after
/// setup and shared by reference across every worker closure.
pub struct ServerContext {
	params: Parameters,
	evaluator: BfvEvaluator,
	encoder: BatchEncoder,
	db: MultiMapDatabase,
	max_workers: usize,
}

impl ServerContext {
	/// Builds a context from an already-populated database.
	pub fn new(
		params: Parameters,
		db: MultiMapDatabase,
		max_workers: usize,
	) -> pantheon_crypto::Result<Self> {
		let evaluator = BfvEvaluator::new(params.context())?;
		let encoder = BatchEncoder::new(params.context())?;

		Ok(Self {
			params,
			evaluator,
			encoder,
			db,
			max_workers: max_workers.max(1),
		})
	}

	/// The shared parameter contract.
	pub fn params(&self) -> &Parameters {
		&self.params
	}

	/// The shared evaluator.
	pub fn evaluator(&self) -> &BfvEvaluator {
		&self.evaluator
	}

	/// The shared encoder.
	pub fn encoder(&self) -> &BatchEncoder {
		&self.encoder
	}

	/// Number of shards in the multi-map database.
	pub fn num_shards(&self) -> usize {
		self.db.num_shards()
	}

	/// Borrows shard `index`.
	pub fn shard(&self, index: usize) -> &Database {
		self.db.shard(index)
	}

	/// The worker budget every pipeline stage fans out across.
	pub fn max_workers(&self) -> usize {
		self.max_workers
	}
}
