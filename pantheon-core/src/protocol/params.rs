//! This module contains re-exports from the generated protocol buffers code.
//!
//! The generated code is not meant to be used directly, but rather through the re-exports in this module.
use super::autogen::pantheon_proto;

/// The [`PirClient`] is the main entry point for interacting with the
/// keyword-PIR protocol: fetching the parameter contract, uploading keys,
/// and sending queries.
///
/// [`PirClient`]: pantheon_proto::pir_client::PirClient
pub use pantheon_proto::pir_client::PirClient;

/// The [`PirServer`] is used to implement the keyword-PIR service.
///
/// [`PirServer`]: pantheon_proto::pir_server::PirServer
pub use pantheon_proto::pir_server::PirServer;

/// The [`Pir`] trait is the service implementation surface served by
/// [`PirServer`] and accessed through [`PirClient`].
pub use pantheon_proto::pir_server::Pir;

/// The wire form of the shared parameter contract (§4.1): the raw inputs
/// and every derived quantity a client needs before it can rebuild an
/// identical parameter contract and `Context` via `ParametersBuilder`.
pub use pantheon_proto::Parameters;

/// An empty request for [`Pir::receive_params`].
pub use pantheon_proto::ReceiveParamsRequest;

/// A generic acknowledgement, used by the key-upload and one-ciphertext
/// RPCs.
pub use pantheon_proto::Ack;
