use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use serde::Deserialize;

use vidseek_domain::{IndexPosition, Record};

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
	indice: IndexPosition,
	video_id: String,
	frame_id: String,
}

/// Maps index positions of one backend to the frame they were embedded from.
#[derive(Debug, Clone, Default)]
pub struct RecordCatalog {
	records: HashMap<IndexPosition, Record>,
}
impl RecordCatalog {
	/// Loads a JSON array of `{indice, video_id, frame_id}` objects.
	pub fn open(path: &Path) -> Result<Self> {
		let file =
			File::open(path).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;
		let entries: Vec<CatalogEntry> = serde_json::from_reader(BufReader::new(file))
			.map_err(|err| Error::ParseCatalog { path: path.to_path_buf(), source: err })?;
		let total = entries.len();
		let catalog = Self::from_records(
			entries
				.into_iter()
				.map(|entry| (entry.indice, Record::new(entry.video_id, entry.frame_id))),
		);

		if catalog.len() != total {
			tracing::warn!(
				path = %path.display(),
				entries = total,
				unique = catalog.len(),
				"Record catalog repeats positions; the last entry for each position wins."
			);
		}

		Ok(catalog)
	}

	pub fn from_records(records: impl IntoIterator<Item = (IndexPosition, Record)>) -> Self {
		Self { records: records.into_iter().collect() }
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn lookup(&self, position: IndexPosition) -> Option<&Record> {
		self.records.get(&position)
	}

	/// Maps positions to records in rank order, skipping positions the catalog does not cover.
	pub fn resolve(&self, positions: &[IndexPosition]) -> Vec<Record> {
		positions.iter().filter_map(|position| self.lookup(*position)).cloned().collect()
	}
}
