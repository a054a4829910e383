/// Errors raised by the parameter contract, database encoder, and threaded
/// BFV primitives.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The accumulated parameter-builder fields are missing, contradictory,
	/// or violate one of the contract's invariants.
	#[error("invalid parameters: {0}")]
	InvalidParams(String),

	/// A key was requested that doesn't appear in the addressed shard.
	#[error("key not found")]
	NotFound,

	/// A lower-level BFV backend call failed.
	#[error("BFV backend error: {0}")]
	Backend(#[from] pantheon_seal::Error),
}

/// Convenience alias for this crate's [`Result`].
pub type Result<T> = std::result::Result<T, Error>;
