//! End-to-end query scenarios against small, fast-to-build parameter sets
//! (§8's S1/S3/S4/S5/S6).

use pantheon_core::server::{process1, process2, query_expand};
use pantheon_core::{Client, ServerContext};
use pantheon_crypto::db::sample_frequencies;
use pantheon_crypto::{MultiMapDatabase, ParametersBuilder, ParetoParams};
use pantheon_seal::{BatchEncoder, BfvEvaluator, Ciphertext, FromBytes, GaloisKeys, RelinearizationKeys, ToBytes};
use rand::rngs::StdRng;
use rand::SeedableRng;

const POLY_MODULUS_DEGREE: u64 = 4096;
const MODULUS_SWITCH_DEPTH: usize = 1;

/// Builds a single-shard database over `keys`/`values` and runs one full
/// query against `target`, returning the reconstructed bytes.
fn run_single_shard_query(
	n: usize,
	key_size_bits: usize,
	obj_size_bytes: usize,
	keys: &[Vec<u8>],
	values: &[Vec<u8>],
	target: &[u8],
) -> Vec<u8> {
	let pareto = ParetoParams {
		scale: 1.0,
		shape: 2.0,
		max_replicas: 1,
	};

	let server_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(key_size_bits)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.expect("server parameters");

	let evaluator = BfvEvaluator::new(server_params.context()).unwrap();
	let encoder = BatchEncoder::new(server_params.context()).unwrap();

	let mut rng = StdRng::seed_from_u64(1);
	let mmdb = MultiMapDatabase::build(
		&server_params,
		1,
		keys,
		values,
		&pareto,
		&mut rng,
		&encoder,
		&evaluator,
		server_params.context(),
	)
	.expect("populate database");

	let shard_indices = mmdb.resolve_all(&[keys.to_vec()], target);

	let server = ServerContext::new(server_params, mmdb, 2).unwrap();

	let client_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(key_size_bits)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.expect("client parameters");
	let client = Client::setup(client_params).unwrap();

	run_query(&server, &client, target, &shard_indices)
}

fn run_query(server: &ServerContext, client: &Client, target: &[u8], shard_indices: &[i64]) -> Vec<u8> {
	let query_ciphertext = client.query_make(target).unwrap();
	let query_bytes = query_ciphertext.as_bytes().unwrap();
	let relin_bytes = client.relin_keys_bytes().unwrap();
	let galois_bytes = client.galois_keys_bytes().unwrap();
	let one_bytes = client.one_ciphertext_bytes().unwrap();

	let server_context = server.params().context();
	let server_query = Ciphertext::from_bytes(server_context, &query_bytes).unwrap();
	let relin_keys = RelinearizationKeys::from_bytes(server_context, &relin_bytes).unwrap();
	let galois_keys = GaloisKeys::from_bytes(server_context, &galois_bytes).unwrap();
	let one_ciphertext = Ciphertext::from_bytes(server_context, &one_bytes).unwrap();

	let eq_columns = query_expand(
		server.evaluator(),
		server.encoder(),
		server.params(),
		&server_query,
		&galois_keys,
		server.max_workers(),
	)
	.unwrap();
	let row_selectors = process1(server, &eq_columns, &one_ciphertext, &relin_keys, &galois_keys).unwrap();
	let answer_stream = process2(server, &row_selectors, &galois_keys).unwrap();

	let client_context = client.parameters().context();
	let client_answers: Vec<Ciphertext> = answer_stream
		.iter()
		.map(|ct| Ciphertext::from_bytes(client_context, &ct.as_bytes().unwrap()).unwrap())
		.collect();

	client.reconstruct(&client_answers, shard_indices).unwrap()
}

fn synthetic_keys_values(n: usize, obj_size_bytes: usize) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
	let keys: Vec<Vec<u8>> = (0..n).map(|i| format!("key-{i:06}").into_bytes()).collect();
	let values: Vec<Vec<u8>> = (0..n)
		.map(|i| {
			let mut value = vec![0u8; obj_size_bytes];
			for (b, byte) in value.iter_mut().enumerate() {
				*byte = ((i + b) % 251) as u8;
			}
			value
		})
		.collect();
	(keys, values)
}

/// S1: target present at row 0 reconstructs to its own value.
#[test]
fn s1_reconstructs_target_at_row_zero() {
	let n = 50;
	let obj_size_bytes = 32;
	let (keys, values) = synthetic_keys_values(n, obj_size_bytes);

	let reconstructed = run_single_shard_query(n, 64, obj_size_bytes, &keys, &values, &keys[0]);

	assert_eq!(reconstructed, values[0]);
}

/// S4: a fixed keyword/value pair stored away from row 0 still round-trips.
#[test]
fn s4_reconstructs_target_at_interior_row() {
	let n = 200;
	let obj_size_bytes = 32;
	let (mut keys, mut values) = synthetic_keys_values(n, obj_size_bytes);

	keys[3] = b"monkk".to_vec();
	let mut stored = b"dhsncjskfnxasdjwwwww".to_vec();
	stored.resize(obj_size_bytes, 0);
	values[3] = stored.clone();

	let reconstructed = run_single_shard_query(n, 64, obj_size_bytes, &keys, &values, b"monkk");

	assert_eq!(reconstructed, stored);
}

/// S5: querying an absent keyword never produces a false positive — the
/// reconstructed bytes are all zero.
#[test]
fn s5_absent_keyword_decodes_to_zero() {
	let n = 50;
	let obj_size_bytes = 32;
	let (keys, values) = synthetic_keys_values(n, obj_size_bytes);

	let reconstructed = run_single_shard_query(n, 64, obj_size_bytes, &keys, &values, b"not-a-real-keyword");

	assert!(reconstructed.iter().all(|&b| b == 0));
}

/// S6: two back-to-back queries for distinct keys produce response streams
/// of identical byte length.
#[test]
fn s6_response_size_independent_of_target() {
	let n = 50;
	let obj_size_bytes = 32;
	let (keys, values) = synthetic_keys_values(n, obj_size_bytes);

	let pareto = ParetoParams {
		scale: 1.0,
		shape: 2.0,
		max_replicas: 1,
	};

	let server_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(64)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.unwrap();

	let evaluator = BfvEvaluator::new(server_params.context()).unwrap();
	let encoder = BatchEncoder::new(server_params.context()).unwrap();

	let mut rng = StdRng::seed_from_u64(2);
	let mmdb = MultiMapDatabase::build(
		&server_params,
		1,
		&keys,
		&values,
		&pareto,
		&mut rng,
		&encoder,
		&evaluator,
		server_params.context(),
	)
	.unwrap();

	let shard_indices_a = mmdb.resolve_all(&[keys.clone()], &keys[1]);
	let shard_indices_b = mmdb.resolve_all(&[keys.clone()], &keys[10]);

	let server = ServerContext::new(server_params, mmdb, 2).unwrap();

	let client_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(64)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.unwrap();
	let client = Client::setup(client_params).unwrap();

	let size_a = response_size(&server, &client, &keys[1], &shard_indices_a);
	let size_b = response_size(&server, &client, &keys[10], &shard_indices_b);

	assert_eq!(size_a, size_b);
}

fn response_size(server: &ServerContext, client: &Client, target: &[u8], shard_indices: &[i64]) -> usize {
	let query_ciphertext = client.query_make(target).unwrap();
	let query_bytes = query_ciphertext.as_bytes().unwrap();
	let relin_bytes = client.relin_keys_bytes().unwrap();
	let galois_bytes = client.galois_keys_bytes().unwrap();
	let one_bytes = client.one_ciphertext_bytes().unwrap();

	let server_context = server.params().context();
	let server_query = Ciphertext::from_bytes(server_context, &query_bytes).unwrap();
	let relin_keys = RelinearizationKeys::from_bytes(server_context, &relin_bytes).unwrap();
	let galois_keys = GaloisKeys::from_bytes(server_context, &galois_bytes).unwrap();
	let one_ciphertext = Ciphertext::from_bytes(server_context, &one_bytes).unwrap();

	let eq_columns = query_expand(
		server.evaluator(),
		server.encoder(),
		server.params(),
		&server_query,
		&galois_keys,
		server.max_workers(),
	)
	.unwrap();
	let row_selectors = process1(server, &eq_columns, &one_ciphertext, &relin_keys, &galois_keys).unwrap();
	let answer_stream = process2(server, &row_selectors, &galois_keys).unwrap();

	let _ = shard_indices;
	answer_stream.iter().map(|ct| ct.as_bytes().unwrap().len()).sum()
}

/// S3: Pareto-sharded multimap with a keyword present in some shards and
/// absent from others — absent shards must decode to all zeros, present
/// shards to the stored value.
#[test]
fn s3_multimap_shards_agree_on_presence() {
	let n = 64;
	let obj_size_bytes = 32;
	let num_shards = 4;
	let (keys, values) = synthetic_keys_values(n, obj_size_bytes);

	let pareto = ParetoParams {
		scale: 1.0,
		shape: 1.5,
		max_replicas: num_shards,
	};

	let server_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(64)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.unwrap();

	let evaluator = BfvEvaluator::new(server_params.context()).unwrap();
	let encoder = BatchEncoder::new(server_params.context()).unwrap();

	let mut rng = StdRng::seed_from_u64(3);
	let mmdb = MultiMapDatabase::build(
		&server_params,
		num_shards,
		&keys,
		&values,
		&pareto,
		&mut rng,
		&encoder,
		&evaluator,
		server_params.context(),
	)
	.unwrap();

	let target_index = 5;
	let target = &keys[target_index];
	let placement = mmdb.placement_of(target_index).to_vec();

	let mut raw_keys_per_shard: Vec<Vec<Vec<u8>>> = vec![Vec::new(); num_shards];
	for (i, key) in keys.iter().enumerate() {
		for &shard in mmdb.placement_of(i) {
			raw_keys_per_shard[shard].push(key.clone());
		}
	}
	let shard_indices = mmdb.resolve_all(&raw_keys_per_shard, target);

	let server = ServerContext::new(server_params, mmdb, 2).unwrap();
	let client_params = ParametersBuilder::new()
		.set_item_count(n)
		.set_key_size_bits(64)
		.set_obj_size_bytes(obj_size_bytes)
		.set_poly_modulus_degree(POLY_MODULUS_DEGREE)
		.set_modulus_switch_depth(MODULUS_SWITCH_DEPTH)
		.build()
		.unwrap();
	let client = Client::setup(client_params).unwrap();

	let reconstructed = run_query(&server, &client, target, &shard_indices);

	let expected = &values[target_index];
	assert_eq!(&reconstructed[..], &expected[..]);
	assert!(!placement.is_empty());
}
