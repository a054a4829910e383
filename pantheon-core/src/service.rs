use std::sync::Arc;

use pantheon_seal::{Ciphertext, FromBytes, GaloisKeys, RelinearizationKeys, ToBytes};
use tokio::sync::Mutex;
use tonic::{Request, Response, Status};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::persist::ClientStore;
use crate::protocol::keys::{KeyBundle, OneCiphertext};
use crate::protocol::params::{Ack, Parameters as WireParameters, Pir, ReceiveParamsRequest};
use crate::protocol::query::{QueryRequest, QueryResponse};
use crate::server::{pipeline, ServerContext};

/// The gRPC service implementation (§6): one [`ServerContext`] shared by
/// every connection, guarded by a [`Mutex`] since the BFV backend's
/// `Context`/`Evaluator` are not safely reentrant across concurrent
/// queries on the same process (§5's single-server mutual exclusion).
pub struct PirService {
	context: Arc<Mutex<ServerContext>>,
	store: ClientStore,
}

impl PirService {
	/// Builds a service around an already-populated [`ServerContext`],
	/// persisting per-client key/one-ciphertext uploads under `data_dir`.
	pub fn new(context: ServerContext, data_dir: impl Into<std::path::PathBuf>) -> Self {
		Self {
			context: Arc::new(Mutex::new(context)),
			store: ClientStore::new(data_dir),
		}
	}

	async fn load_client_keys(&self, client_id: &str) -> Result<(RelinearizationKeys, GaloisKeys)> {
		let relin_bytes = self
			.store
			.read_relin_keys(client_id)?
			.ok_or(Error::UnauthenticatedClient)?;
		let galois_bytes = self
			.store
			.read_galois_keys(client_id)?
			.ok_or(Error::UnauthenticatedClient)?;

		let context = self.context.lock().await.params().context().clone();
		let relin_keys = RelinearizationKeys::from_bytes(&context, &relin_bytes)?;
		let galois_keys = GaloisKeys::from_bytes(&context, &galois_bytes)?;

		Ok((relin_keys, galois_keys))
	}

	async fn handle_receive_params(&self) -> Result<WireParameters> {
		let guard = self.context.lock().await;
		let params = guard.params();

		Ok(WireParameters {
			item_count: params.item_count() as u64,
			key_size_bits: params.key_size_bits() as u64,
			obj_size_bytes: params.obj_size_bytes() as u64,
			poly_modulus_degree: params.poly_modulus_degree(),
			plain_modulus: params.plain_modulus(),
			modulus_switch_depth: params.modulus_switch_depth() as u64,
			num_col: params.num_col() as u64,
			num_row: params.num_row() as u64,
			pir_num_columns_per_obj: params.pir_num_columns_per_obj() as u64,
			pir_db_rows: params.pir_db_rows() as u64,
			pir_num_query_ciphertext: params.pir_num_query_ciphertext() as u64,
			squarings: params.squarings(),
		})
	}

	async fn handle_send_keys(&self, bundle: KeyBundle) -> Result<Ack> {
		self.store.write_relin_keys(&bundle.client_id, &bundle.relin_keys)?;
		self.store.write_galois_keys(&bundle.client_id, &bundle.galois_keys)?;
		Ok(Ack { ok: true })
	}

	async fn handle_send_one_ciphertext(&self, upload: OneCiphertext) -> Result<Ack> {
		self.store.write_one_ciphertext(&upload.client_id, &upload.ciphertext)?;
		Ok(Ack { ok: true })
	}

	/// `Query`: runs the three-stage pipeline (`QueryExpand` → `Process1`
	/// → `Process2`) against the query ciphertext the client sent, using
	/// that client's previously-uploaded keys.
	async fn handle_query(&self, query: QueryRequest) -> Result<QueryResponse> {
		if !self.store.is_authenticated(&query.client_id)? {
			return Err(Error::UnauthenticatedClient);
		}

		let (relin_keys, galois_keys) = self.load_client_keys(&query.client_id).await?;
		let one_bytes = self
			.store
			.read_one_ciphertext(&query.client_id)?
			.ok_or(Error::UnauthenticatedClient)?;

		let guard = self.context.lock().await;

		let one_ciphertext = Ciphertext::from_bytes(guard.params().context(), &one_bytes)?;
		let query_bytes = query
			.query_ciphertexts
			.first()
			.ok_or_else(|| Error::DecodeFailed("empty query".into()))?;
		let query_ciphertext = Ciphertext::from_bytes(guard.params().context(), query_bytes)?;

		let eq_columns = pipeline::query_expand(
			guard.evaluator(),
			guard.encoder(),
			guard.params(),
			&query_ciphertext,
			&galois_keys,
			guard.max_workers(),
		)?;

		let row_selectors = pipeline::process1(&guard, &eq_columns, &one_ciphertext, &relin_keys, &galois_keys)?;
		let answer_stream = pipeline::process2(&guard, &row_selectors, &galois_keys)?;

		let result_ciphertexts = answer_stream
			.iter()
			.map(ToBytes::as_bytes)
			.collect::<pantheon_seal::Result<Vec<_>>>()?;

		Ok(QueryResponse { result_ciphertexts })
	}
}

#[tonic::async_trait]
impl Pir for PirService {
	/// `ReceiveParams`: echoes the raw parameter inputs so every client
	/// derives an identical contract via `ParametersBuilder` (§4.1, §6).
	#[instrument(skip(self, _request))]
	async fn receive_params(
		&self,
		_request: Request<ReceiveParamsRequest>,
	) -> std::result::Result<Response<WireParameters>, Status> {
		self.handle_receive_params().await.map(Response::new).map_err(Status::from)
	}

	/// `SendKeys`: persists a client's Galois and relinearization keys,
	/// keyed by `client_id`. No secret key material is ever accepted here.
	#[instrument(skip(self, request))]
	async fn send_keys(&self, request: Request<KeyBundle>) -> std::result::Result<Response<Ack>, Status> {
		self.handle_send_keys(request.into_inner())
			.await
			.map(Response::new)
			.map_err(Status::from)
	}

	/// `SendOneCiphertext`: persists the client's pre-encrypted `one_ct`.
	#[instrument(skip(self, request))]
	async fn send_one_ciphertext(
		&self,
		request: Request<OneCiphertext>,
	) -> std::result::Result<Response<Ack>, Status> {
		self.handle_send_one_ciphertext(request.into_inner())
			.await
			.map(Response::new)
			.map_err(Status::from)
	}

	/// `Query`: see [`PirService::handle_query`].
	#[instrument(skip(self, request))]
	async fn query(&self, request: Request<QueryRequest>) -> std::result::Result<Response<QueryResponse>, Status> {
		self.handle_query(request.into_inner())
			.await
			.map(Response::new)
			.map_err(Status::from)
	}
}
