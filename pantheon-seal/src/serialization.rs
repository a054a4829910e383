use crate::error::Result;

/// The compression strategy used when serializing a SEAL object to bytes.
///
/// `ZStd` is the default used everywhere in this crate; `None` exists
/// mainly so callers can compare on-wire sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
	/// No compression.
	None = 0,
	/// Zlib compression.
	ZLib = 1,
	/// Zstandard compression. Used by default.
	ZStd = 2,
}

/// Implemented by types that know how to serialize themselves to SEAL's
/// native binary format.
pub trait ToBytes {
	/// Serializes `self` into a byte buffer.
	fn as_bytes(&self) -> Result<Vec<u8>>;
}

/// Implemented by types that know how to deserialize themselves from SEAL's
/// native binary format.
///
/// Most SEAL types need a [`Context`](crate::Context) to validate against
/// while loading; a few (e.g. [`EncryptionParameters`](crate::EncryptionParameters))
/// need nothing at all. `State` captures whichever of those is required.
pub trait FromBytes {
	/// Extra state required to validate the deserialized value, usually a
	/// [`Context`](crate::Context).
	type State;

	/// Deserializes `bytes` into `Self`, validating it against `state`.
	fn from_bytes(state: &Self::State, bytes: &[u8]) -> Result<Self>
	where
		Self: Sized;
}
