//! Batch-level fan-out over independent BFV calls.
//!
//! The FFI backend in `pantheon_seal` can't be parallelized internally at
//! RNS-component granularity from Rust — `Evaluator`/`Encryptor` calls are
//! opaque C++ calls. What this module parallelizes instead is the *batch*:
//! a query touches many independent ciphertexts (one per Galois step, one
//! per database row-batch, one per value column), and those are
//! embarrassingly parallel. `std::thread::scope` lets worker closures
//! borrow the shared `Context`/keys/evaluator without `Arc` cloning, and
//! guarantees every spawned thread is joined before the call returns.

use std::thread;

use pantheon_seal::{Ciphertext, Evaluator, GaloisKeys, Plaintext, RelinearizationKeys};

use crate::batch::Batch;
use crate::error::Result;

/// Runs `rotate_rows` over every ciphertext/step pair in `work`, one
/// worker thread per pair, up to `max_workers` threads in flight at once.
///
/// This realizes `QueryExpand`'s replicate loop (§4.4 Stage 1): each
/// Galois step produces an independent rotated copy of the query
/// ciphertext, combined afterward by the caller.
pub fn rotate_rows_batch(
	evaluator: &(impl Evaluator<Ciphertext = Ciphertext> + Sync),
	input: &Ciphertext,
	steps: &[i32],
	galois_keys: &GaloisKeys,
	max_workers: usize,
) -> Result<Batch<Ciphertext>> {
	run_chunked(steps, max_workers, |chunk| {
		chunk
			.iter()
			.map(|&step| evaluator.rotate_rows(input, step, galois_keys).map_err(Into::into))
			.collect()
	})
}

/// Runs `multiply_plain` over each `(ciphertext, plaintext)` pair in
/// `work`, fanned out across up to `max_workers` threads.
///
/// Used by `Process2`'s one-hot selector application (§4.4 Stage 3): each
/// database column's extraction is independent of every other column's.
pub fn multiply_plain_batch(
	evaluator: &(impl Evaluator<Ciphertext = Ciphertext, Plaintext = Plaintext> + Sync),
	work: &[(Ciphertext, Plaintext)],
	max_workers: usize,
) -> Result<Batch<Ciphertext>> {
	run_chunked(work, max_workers, |chunk| {
		chunk
			.iter()
			.map(|(ct, pt)| evaluator.multiply_plain(ct, pt).map_err(Into::into))
			.collect()
	})
}

/// Runs the equality-check fingerprint's exponentiation step
/// (`a^(t-1)` via repeated squaring) over every ciphertext in `work`,
/// fanned out across up to `max_workers` threads.
///
/// Realizes `Process1`'s per-column fingerprint check (§4.4 Stage 2): each
/// column's equality test is independent of the others until the final
/// column-tree reduction.
pub fn exponentiate_batch(
	evaluator: &(impl Evaluator<Ciphertext = Ciphertext> + Sync),
	work: &[Ciphertext],
	exponent: u64,
	relin_keys: &RelinearizationKeys,
	max_workers: usize,
) -> Result<Batch<Ciphertext>> {
	run_chunked(work, max_workers, |chunk| {
		chunk
			.iter()
			.map(|ct| {
				evaluator
					.exponentiate(ct, exponent, relin_keys)
					.map_err(Into::into)
			})
			.collect()
	})
}

/// Splits `items` into `max_workers` (or fewer) contiguous chunks, runs
/// `work` on each chunk in its own scoped thread, and reassembles the
/// results in original order.
fn run_chunked<T: Sync, U: Send>(
	items: &[T],
	max_workers: usize,
	work: impl Fn(&[T]) -> Result<Vec<U>> + Sync,
) -> Result<Batch<U>> {
	if items.is_empty() {
		return Ok(Batch::new());
	}

	let worker_count = max_workers.max(1).min(items.len());
	let chunk_size = items.len().div_ceil(worker_count);

	let results: Result<Vec<Vec<U>>> = thread::scope(|scope| {
		let handles: Vec<_> = items
			.chunks(chunk_size)
			.map(|chunk| scope.spawn(|| work(chunk)))
			.collect();

		handles
			.into_iter()
			.map(|handle| handle.join().expect("worker thread panicked"))
			.collect()
	});

	Ok(Batch(results?.into_iter().flatten().collect()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn run_chunked_preserves_order_and_count() {
		let items: Vec<u64> = (0..37).collect();

		let result: Batch<u64> = run_chunked(&items, 4, |chunk| {
			Ok(chunk.iter().map(|&x| x * 2).collect())
		})
		.unwrap();

		let expected: Vec<u64> = items.iter().map(|&x| x * 2).collect();
		assert_eq!(result.0, expected);
	}

	#[test]
	fn run_chunked_handles_empty_input() {
		let items: Vec<u64> = Vec::new();

		let result: Batch<u64> = run_chunked(&items, 4, |chunk| Ok(chunk.to_vec())).unwrap();

		assert!(result.is_empty());
	}
}
