/// Auto-generated protocol buffers.
pub mod autogen;

/// The parameter contract message and its server/client RPC stubs.
pub mod params;

/// Key upload messages (Galois keys, relinearization keys).
pub mod keys;

/// Query request/response messages.
pub mod query;
