use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::error::{Error, Result};

/// Per-client binary blob storage: `<base>/<id>/keys` and
/// `<base>/<id>/oneciphertext`. Both are written and read via plain
/// `std::fs`, scoped to a configurable base directory.
pub struct ClientStore {
	base_dir: PathBuf,
}

impl ClientStore {
	/// Opens (creating if necessary) a store rooted at `base_dir`.
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
		}
	}

	fn client_dir(&self, client_id: &str) -> PathBuf {
		self.base_dir.join(client_id)
	}

	/// Writes `bytes` to `<base>/<id>/relin_keys`.
	#[instrument(skip(self, bytes))]
	pub fn write_relin_keys(&self, client_id: &str, bytes: &[u8]) -> Result<()> {
		self.write_blob(client_id, "relin_keys", bytes)
	}

	/// Reads `<base>/<id>/relin_keys`, if present.
	pub fn read_relin_keys(&self, client_id: &str) -> Result<Option<Vec<u8>>> {
		self.read_blob(client_id, "relin_keys")
	}

	/// Writes `bytes` to `<base>/<id>/galois_keys`.
	#[instrument(skip(self, bytes))]
	pub fn write_galois_keys(&self, client_id: &str, bytes: &[u8]) -> Result<()> {
		self.write_blob(client_id, "galois_keys", bytes)
	}

	/// Reads `<base>/<id>/galois_keys`, if present.
	pub fn read_galois_keys(&self, client_id: &str) -> Result<Option<Vec<u8>>> {
		self.read_blob(client_id, "galois_keys")
	}

	/// Writes `bytes` to `<base>/<id>/oneciphertext`.
	#[instrument(skip(self, bytes))]
	pub fn write_one_ciphertext(&self, client_id: &str, bytes: &[u8]) -> Result<()> {
		self.write_blob(client_id, "oneciphertext", bytes)
	}

	/// Reads `<base>/<id>/oneciphertext`, if present.
	pub fn read_one_ciphertext(&self, client_id: &str) -> Result<Option<Vec<u8>>> {
		self.read_blob(client_id, "oneciphertext")
	}

	/// Whether `client_id` has uploaded keys and a one-ciphertext.
	pub fn is_authenticated(&self, client_id: &str) -> Result<bool> {
		Ok(self.read_relin_keys(client_id)?.is_some()
			&& self.read_galois_keys(client_id)?.is_some()
			&& self.read_one_ciphertext(client_id)?.is_some())
	}

	fn write_blob(&self, client_id: &str, name: &str, bytes: &[u8]) -> Result<()> {
		let dir = self.client_dir(client_id);
		std::fs::create_dir_all(&dir)?;
		std::fs::write(blob_path(&dir, name), bytes)?;
		Ok(())
	}

	fn read_blob(&self, client_id: &str, name: &str) -> Result<Option<Vec<u8>>> {
		let path = blob_path(&self.client_dir(client_id), name);
		match std::fs::read(&path) {
			Ok(bytes) => Ok(Some(bytes)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(Error::Io(e)),
		}
	}
}

fn blob_path(dir: &Path, name: &str) -> PathBuf {
	dir.join(name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_keys_blob() {
		let dir = std::env::temp_dir().join(format!("pantheon-test-{}", std::process::id()));
		let store = ClientStore::new(&dir);

		store.write_relin_keys("alice", b"relin").unwrap();
		let read = store.read_relin_keys("alice").unwrap();

		assert_eq!(read, Some(b"relin".to_vec()));
		std::fs::remove_dir_all(&dir).ok();
	}

	#[test]
	fn unauthenticated_until_both_blobs_present() {
		let dir = std::env::temp_dir().join(format!("pantheon-test-auth-{}", std::process::id()));
		let store = ClientStore::new(&dir);

		assert!(!store.is_authenticated("bob").unwrap());
		store.write_relin_keys("bob", b"r").unwrap();
		store.write_galois_keys("bob", b"g").unwrap();
		assert!(!store.is_authenticated("bob").unwrap());
		store.write_one_ciphertext("bob", b"c").unwrap();
		assert!(store.is_authenticated("bob").unwrap());

		std::fs::remove_dir_all(&dir).ok();
	}
}
