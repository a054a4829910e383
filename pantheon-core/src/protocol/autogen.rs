/// The generated protocol buffers code, compiled from `proto/pantheon/pir.proto`
/// by `build.rs`. Not meant to be used directly outside this module — the
/// rest of `protocol` re-exports the pieces callers actually need.
pub mod pantheon_proto {
	#![allow(clippy::all)]
	include!(concat!(env!("OUT_DIR"), "/pantheon.proto.rs"));
}
