use std::os::raw::c_long;

use static_assertions::const_assert;

use crate::bindgen::{E_INVALIDARG, E_OUTOFMEMORY, E_POINTER, E_UNEXPECTED};

/// A type representing all errors that can occur in the SEAL backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// An argument is invalid.
	#[error("the argument is not valid")]
	InvalidArgument,

	/// A pointer is invalid. Encountering this error through this crate's
	/// safe API is a bug.
	#[error("invalid pointer")]
	InvalidPointer,

	/// The machine ran out of memory.
	#[error("out of memory")]
	OutOfMemory,

	/// An unknown error occurred in SEAL.
	#[error("unexpected SEAL error")]
	Unexpected,

	/// An unrecognized native error code.
	#[error("unknown SEAL error code {0}")]
	Unknown(c_long),

	/// The caller failed to set a polynomial modulus degree.
	#[error("polynomial modulus degree not set")]
	DegreeNotSet,

	/// The caller failed to set a coefficient modulus.
	#[error("coefficient modulus not set")]
	CoefficientModulusNotSet,

	/// The caller failed to set a plaintext modulus.
	#[error("plain modulus not set")]
	PlainModulusNotSet,

	/// A requested rotation step has no corresponding Galois key.
	#[error("no galois key for rotation step {0}")]
	MissingGaloisStep(i32),

	/// (De)serialization failed.
	#[error("serialization error: {0}")]
	SerializationError(Box<String>),
}

const_assert!(std::mem::size_of::<Error>() <= 16);

impl From<c_long> for Error {
	fn from(err: c_long) -> Self {
		match err {
			E_POINTER => Error::InvalidPointer,
			E_INVALIDARG => Error::InvalidArgument,
			E_OUTOFMEMORY => Error::OutOfMemory,
			E_UNEXPECTED => Error::Unexpected,
			_ => Error::Unknown(err),
		}
	}
}

/// The result type for SEAL backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Turns a native `c_long` status code into a [`Result`].
#[macro_export]
macro_rules! try_seal {
	($err:expr) => {
		if $err == $crate::bindgen::E_OK {
			Ok(())
		} else {
			Err($crate::Error::from($err))
		}
	};
}

/// Converts a SEAL error code into a Rust [`Result`] error.
pub fn convert_seal_error(err: c_long) -> Result<()> {
	try_seal!(err)
}
