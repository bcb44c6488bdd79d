use std::{
	collections::{BTreeMap, HashMap},
	fmt,
	sync::Arc,
};

use serde::Serialize;

use vidseek_domain::{BackendId, IndexPosition, Record};

use crate::{Error, FlatIndex, RecordCatalog, Result, VectorIndex};

/// Everything needed to answer queries for one backend.
#[derive(Clone)]
pub struct BackendEntry {
	pub id: BackendId,
	pub index: Arc<dyn VectorIndex>,
	pub catalog: Arc<RecordCatalog>,
}
impl BackendEntry {
	pub fn new(id: BackendId, index: Arc<dyn VectorIndex>, catalog: Arc<RecordCatalog>) -> Self {
		Self { id, index, catalog }
	}

	pub fn load(cfg: &vidseek_config::Backend) -> Result<Self> {
		let index = FlatIndex::open(&cfg.index_path)?;
		let expected = cfg.dimensions as usize;

		if index.dimensions() != expected {
			return Err(Error::ConfiguredDimension {
				backend: cfg.id,
				expected,
				actual: index.dimensions(),
			});
		}

		let catalog = RecordCatalog::open(&cfg.catalog_path)?;

		tracing::info!(
			backend = %cfg.id,
			dimensions = expected,
			rows = index.len(),
			records = catalog.len(),
			"Backend loaded."
		);

		if catalog.len() < index.len() {
			tracing::warn!(
				backend = %cfg.id,
				rows = index.len(),
				records = catalog.len(),
				"Record catalog covers fewer positions than the index; uncovered hits will be dropped."
			);
		}

		Ok(Self::new(cfg.id, Arc::new(index), Arc::new(catalog)))
	}

	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexPosition>> {
		let expected = self.index.dimensions();

		if query.len() != expected {
			return Err(Error::DimensionMismatch {
				backend: self.id,
				expected,
				actual: query.len(),
			});
		}

		self.index.search(query, k)
	}
}
impl fmt::Debug for BackendEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BackendEntry")
			.field("id", &self.id)
			.field("dimensions", &self.index.dimensions())
			.field("rows", &self.index.len())
			.field("records", &self.catalog.len())
			.finish()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
	Ready,
	Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSummary {
	pub backend: BackendId,
	pub status: BackendStatus,
	pub dimensions: Option<usize>,
	pub records: Option<usize>,
}

/// Process-wide table of loaded backends, built once and then only read.
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
	ready: HashMap<BackendId, BackendEntry>,
	unavailable: BTreeMap<BackendId, String>,
}
impl BackendRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads every configured backend.
	///
	/// A backend that fails to load is excluded as a whole and reported as unavailable, unless
	/// `require_all` is set, in which case the failure is returned. Loading fails when no backend
	/// is left to serve.
	pub fn load(backends: &[vidseek_config::Backend], require_all: bool) -> Result<Self> {
		let mut registry = Self::new();

		for cfg in backends {
			match BackendEntry::load(cfg) {
				Ok(entry) => registry.insert(entry),
				Err(err) if require_all => {
					return Err(Error::BackendLoad { backend: cfg.id, source: Box::new(err) });
				},
				Err(err) => {
					tracing::error!(
						backend = %cfg.id,
						error = %err,
						"Backend failed to load and will not serve requests."
					);
					registry.mark_unavailable(cfg.id, err.to_string());
				},
			}
		}

		if registry.ready.is_empty() {
			return Err(Error::NoBackends);
		}

		Ok(registry)
	}

	pub fn insert(&mut self, entry: BackendEntry) {
		self.unavailable.remove(&entry.id);
		self.ready.insert(entry.id, entry);
	}

	pub fn mark_unavailable(&mut self, id: BackendId, reason: impl Into<String>) {
		self.ready.remove(&id);
		self.unavailable.insert(id, reason.into());
	}

	pub fn is_configured(&self, id: BackendId) -> bool {
		self.ready.contains_key(&id) || self.unavailable.contains_key(&id)
	}

	pub fn entry(&self, id: BackendId) -> Result<&BackendEntry> {
		if let Some(entry) = self.ready.get(&id) {
			return Ok(entry);
		}
		if self.unavailable.contains_key(&id) {
			return Err(Error::BackendUnavailable { backend: id });
		}

		Err(Error::BackendNotFound { backend: id })
	}

	pub fn search(&self, id: BackendId, query: &[f32], k: usize) -> Result<Vec<IndexPosition>> {
		self.entry(id)?.search(query, k)
	}

	pub fn lookup(&self, id: BackendId, position: IndexPosition) -> Result<Option<&Record>> {
		Ok(self.entry(id)?.catalog.lookup(position))
	}

	pub fn resolve(&self, id: BackendId, positions: &[IndexPosition]) -> Result<Vec<Record>> {
		Ok(self.entry(id)?.catalog.resolve(positions))
	}

	/// One summary per configured backend, ordered by backend id.
	pub fn summaries(&self) -> Vec<BackendSummary> {
		let mut out: Vec<BackendSummary> = self
			.ready
			.values()
			.map(|entry| BackendSummary {
				backend: entry.id,
				status: BackendStatus::Ready,
				dimensions: Some(entry.index.dimensions()),
				records: Some(entry.catalog.len()),
			})
			.chain(self.unavailable.keys().map(|id| BackendSummary {
				backend: *id,
				status: BackendStatus::Unavailable,
				dimensions: None,
				records: None,
			}))
			.collect();

		out.sort_by_key(|summary| summary.backend);

		out
	}
}
