mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::{Map, Value};
use uuid::Uuid;

use vidseek_config::{Backend, Config, EmbeddingProviderConfig, Retrieval, Service};
use vidseek_domain::{BackendId, IndexPosition, Record};
use vidseek_index::{INDEX_MAGIC, VectorIndex};

/// Scratch directory for index and catalog files, removed on drop.
pub struct TestDir {
	path: PathBuf,
	cleaned: bool,
}
impl TestDir {
	pub fn new(prefix: &str) -> Result<Self> {
		let path = env::temp_dir().join(format!("{prefix}_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn write_index(&self, name: &str, dimensions: u32, rows: &[Vec<f32>]) -> Result<PathBuf> {
		let path = self.path.join(name);

		fs::write(&path, encode_index(dimensions, rows)?)?;

		Ok(path)
	}

	/// Writes `(indice, video_id, frame_id)` triples in the catalog JSON layout.
	pub fn write_catalog(&self, name: &str, entries: &[(IndexPosition, &str, &str)]) -> Result<PathBuf> {
		let path = self.path.join(name);
		let payload: Vec<Value> = entries
			.iter()
			.map(|(indice, video_id, frame_id)| {
				serde_json::json!({ "indice": indice, "video_id": video_id, "frame_id": frame_id })
			})
			.collect();

		fs::write(&path, serde_json::to_vec(&payload)?)?;

		Ok(path)
	}

	pub fn write_raw(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
		let path = self.path.join(name);

		fs::write(&path, bytes)?;

		Ok(path)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDir {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test directory cleanup failed for {:?}: {err}.", self.path);
		}
	}
}

/// Index that ignores the query and returns the same positions every time.
pub struct FixedIndex {
	dimensions: usize,
	positions: Vec<IndexPosition>,
	calls: Arc<AtomicUsize>,
}
impl FixedIndex {
	pub fn new(dimensions: usize, positions: Vec<IndexPosition>) -> Self {
		Self { dimensions, positions, calls: Arc::new(AtomicUsize::new(0)) }
	}

	/// Shared counter of `search` calls, readable after the index is moved into a registry.
	pub fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}
impl VectorIndex for FixedIndex {
	fn dimensions(&self) -> usize {
		self.dimensions
	}

	fn len(&self) -> usize {
		self.positions.len()
	}

	fn search(&self, query: &[f32], k: usize) -> vidseek_index::Result<Vec<IndexPosition>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		if query.len() != self.dimensions {
			return Err(vidseek_index::Error::QueryDimension {
				expected: self.dimensions,
				actual: query.len(),
			});
		}

		Ok(self.positions.iter().take(k).copied().collect())
	}
}

pub fn encode_index(dimensions: u32, rows: &[Vec<f32>]) -> Result<Vec<u8>> {
	let mut bytes = INDEX_MAGIC.to_vec();

	bytes.extend_from_slice(&dimensions.to_le_bytes());
	bytes.extend_from_slice(&(rows.len() as u64).to_le_bytes());

	for (row, values) in rows.iter().enumerate() {
		if values.len() != dimensions as usize {
			return Err(Error::Message(format!(
				"Row {row} has {} values; expected {dimensions}.",
				values.len()
			)));
		}

		for value in values {
			bytes.extend_from_slice(&value.to_le_bytes());
		}
	}

	Ok(bytes)
}

/// Catalog records keyed the way a catalog file would list them.
pub fn records(entries: &[(IndexPosition, &str, &str)]) -> Vec<(IndexPosition, Record)> {
	entries
		.iter()
		.map(|(indice, video_id, frame_id)| (*indice, Record::new(*video_id, *frame_id)))
		.collect()
}

pub fn embedding_config(api_base: &str) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		api_base: api_base.to_string(),
		api_key: "test-key".to_string(),
		text_path: "/v1/embeddings/text".to_string(),
		image_path: "/v1/embeddings/image".to_string(),
		model: "clip-test".to_string(),
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

pub fn backend_config(
	id: BackendId,
	index_path: PathBuf,
	catalog_path: PathBuf,
	dimensions: u32,
) -> Backend {
	Backend {
		id,
		index_path,
		catalog_path,
		dimensions,
		embedding: embedding_config("http://127.0.0.1:1"),
	}
}

pub fn test_config(backends: Vec<Backend>) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		retrieval: Retrieval {
			default_top_k: 10,
			max_top_k: 100,
			max_events: 4,
			max_concurrent_queries: 2,
			sequence_timeout_ms: 5_000,
			require_all_backends: false,
		},
		backends,
	}
}
