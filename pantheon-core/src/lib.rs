//! Wire protocol, server pipeline, client session, and gRPC service glue
//! for a keyword-PIR deployment over BFV (see `pantheon-crypto` and
//! `pantheon-seal` for the cryptographic layer beneath this crate).

pub mod client;
pub mod config;
pub mod error;
pub mod persist;
pub mod protocol;
pub mod server;
pub mod service;

pub use client::Client;
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use persist::ClientStore;
pub use server::ServerContext;
pub use service::PirService;
