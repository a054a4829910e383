use std::ffi::c_void;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::bindgen;
use crate::error::{convert_seal_error, Result};

/// A pool from which SEAL allocates the scratch space it needs while
/// performing homomorphic operations.
///
/// The server pipeline keeps one pool per database column so that
/// concurrently running column workers never contend over allocator
/// internals.
pub struct MemoryPool {
	handle: AtomicPtr<c_void>,
}

unsafe impl Sync for MemoryPool {}
unsafe impl Send for MemoryPool {}

impl MemoryPool {
	/// Creates a new, thread-local memory pool.
	pub fn new() -> Result<Self> {
		let mut handle: *mut c_void = null_mut();

		convert_seal_error(unsafe { bindgen::MemoryPoolHandle_Create(&mut handle) })?;

		Ok(Self {
			handle: AtomicPtr::new(handle),
		})
	}

	pub(crate) fn get_handle(&self) -> *mut c_void {
		self.handle.load(Ordering::SeqCst)
	}
}

impl Default for MemoryPool {
	fn default() -> Self {
		Self::new().expect("failed to allocate default memory pool")
	}
}

impl Drop for MemoryPool {
	fn drop(&mut self) {
		convert_seal_error(unsafe { bindgen::MemoryPoolHandle_Destroy(self.get_handle()) })
			.expect("internal error");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn can_create_and_destroy_memory_pool() {
		let pool = MemoryPool::new().unwrap();

		std::mem::drop(pool);
	}
}
