use tonic::Status;

/// Errors raised by the wire service, client session, and server pipeline.
///
/// Each variant maps to exactly one `tonic::Status` code (see
/// `From<Error> for Status` below); `NotFound` is deliberately absent from
/// that mapping since it never reaches the RPC boundary as an error — the
/// pipeline always returns a well-formed answer for it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Mismatched or missing encryption parameters.
	#[error("invalid parameters: {0}")]
	InvalidParams(String),

	/// A query arrived before its client uploaded keys and a one-ciphertext.
	#[error("client has not uploaded keys and a one-ciphertext")]
	UnauthenticatedClient,

	/// A chunked upload failed partway through.
	#[error("transport broken mid-stream: {0}")]
	TransportBroken(String),

	/// The client disconnected while the server was still computing.
	#[error("request cancelled")]
	Cancelled,

	/// A serialized object failed to deserialize.
	#[error("failed to decode: {0}")]
	DecodeFailed(String),

	/// A key was absent from every shard. Not surfaced as an RPC error —
	/// logged and counted so the benchmark CLI's `correct` column can be
	/// computed.
	#[error("key not found in any shard")]
	NotFound,

	/// A lower layer's error, wrapped without reinterpretation.
	#[error("crypto layer error: {0}")]
	Crypto(#[from] pantheon_crypto::Error),

	/// A BFV backend call failed directly against `pantheon_seal`, bypassing
	/// `pantheon_crypto`'s wrapper (the client session talks to the backend
	/// directly for key generation and encryption).
	#[error("BFV backend error: {0}")]
	Seal(#[from] pantheon_seal::Error),

	/// A persistence I/O failure.
	#[error("persistence error: {0}")]
	Io(#[from] std::io::Error),
}

/// Convenience alias for this crate's [`Result`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for Status {
	fn from(error: Error) -> Self {
		let message = error.to_string();

		match error {
			Error::InvalidParams(_) => Status::invalid_argument(message),
			Error::UnauthenticatedClient => Status::unauthenticated(message),
			Error::TransportBroken(_) => Status::aborted(message),
			Error::Cancelled => Status::cancelled(message),
			Error::DecodeFailed(_) => Status::data_loss(message),
			Error::NotFound => Status::internal(message),
			Error::Crypto(_) | Error::Seal(_) | Error::Io(_) => Status::internal(message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_each_variant_to_its_status_code() {
		assert_eq!(
			Status::from(Error::InvalidParams("x".into())).code(),
			tonic::Code::InvalidArgument
		);
		assert_eq!(Status::from(Error::UnauthenticatedClient).code(), tonic::Code::Unauthenticated);
		assert_eq!(Status::from(Error::TransportBroken("x".into())).code(), tonic::Code::Aborted);
		assert_eq!(Status::from(Error::Cancelled).code(), tonic::Code::Cancelled);
		assert_eq!(Status::from(Error::DecodeFailed("x".into())).code(), tonic::Code::DataLoss);
		assert_eq!(Status::from(Error::NotFound).code(), tonic::Code::Internal);
	}

	#[test]
	fn crypto_and_io_errors_map_to_internal() {
		let io_error = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
		assert_eq!(Status::from(io_error).code(), tonic::Code::Internal);
	}
}
