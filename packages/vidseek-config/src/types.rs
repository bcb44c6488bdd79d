use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

use vidseek_domain::BackendId;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub retrieval: Retrieval,
	pub backends: Vec<Backend>,
}
impl Config {
	pub fn backend(&self, id: BackendId) -> Option<&Backend> {
		self.backends.iter().find(|backend| backend.id == id)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Result count used when a request does not name one.
	pub default_top_k: u32,
	pub max_top_k: u32,
	/// Upper bound on sub-events in one sequence request.
	pub max_events: u32,
	/// Sub-queries of one sequence that may run at the same time.
	pub max_concurrent_queries: u32,
	/// Deadline for a whole sequence when the caller does not pass one.
	pub sequence_timeout_ms: u64,
	/// Refuse to start unless every configured backend loads.
	pub require_all_backends: bool,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			default_top_k: 500,
			max_top_k: 2_000,
			max_events: 8,
			max_concurrent_queries: 4,
			sequence_timeout_ms: 30_000,
			require_all_backends: false,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	pub id: BackendId,
	pub index_path: PathBuf,
	pub catalog_path: PathBuf,
	pub dimensions: u32,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub text_path: String,
	pub image_path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
