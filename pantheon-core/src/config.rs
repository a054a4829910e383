use serde::Deserialize;

/// The wire service's layered configuration: environment variables
/// prefixed `PANTHEON_`, falling back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	/// The gRPC listen address, e.g. `0.0.0.0:50051`.
	pub listen_addr: String,
	/// Base directory for per-client persisted state.
	pub data_dir: String,
	/// `n`, the item count the default `Parameters` should be built for if
	/// none are persisted yet.
	pub default_item_count: usize,
	/// Keyword width in bits, for the default `Parameters`.
	pub default_key_size_bits: usize,
	/// Value width in bytes, for the default `Parameters`.
	pub default_obj_size_bytes: usize,
	/// `tracing-subscriber` env filter directive, e.g. `info` or
	/// `pantheon_core=debug`.
	pub log_filter: String,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			listen_addr: "0.0.0.0:50051".into(),
			data_dir: "data".into(),
			default_item_count: 10_000,
			default_key_size_bits: 64,
			default_obj_size_bytes: 128,
			log_filter: "info".into(),
		}
	}
}

impl ServerConfig {
	/// Builds a config from `PANTHEON_*` environment variables, falling
	/// back to [`Default::default`] for anything unset or unparsable.
	pub fn from_env() -> Self {
		let mut config = Self::default();

		if let Ok(v) = std::env::var("PANTHEON_LISTEN_ADDR") {
			config.listen_addr = v;
		}
		if let Ok(v) = std::env::var("PANTHEON_DATA_DIR") {
			config.data_dir = v;
		}
		if let Ok(v) = std::env::var("PANTHEON_ITEM_COUNT") {
			if let Ok(parsed) = v.parse() {
				config.default_item_count = parsed;
			}
		}
		if let Ok(v) = std::env::var("PANTHEON_KEY_SIZE_BITS") {
			if let Ok(parsed) = v.parse() {
				config.default_key_size_bits = parsed;
			}
		}
		if let Ok(v) = std::env::var("PANTHEON_OBJ_SIZE_BYTES") {
			if let Ok(parsed) = v.parse() {
				config.default_obj_size_bytes = parsed;
			}
		}
		if let Ok(v) = std::env::var("PANTHEON_LOG_FILTER") {
			config.log_filter = v;
		}

		config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_has_sane_listen_addr() {
		let config = ServerConfig::default();
		assert_eq!(config.listen_addr, "0.0.0.0:50051");
	}
}
