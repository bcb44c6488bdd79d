mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, EmbeddingProviderConfig, Retrieval, Service};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::validation("service.http_bind must be non-empty."));
	}

	validate_retrieval(cfg)?;

	if cfg.backends.is_empty() {
		return Err(Error::validation("At least one [[backends]] entry is required."));
	}

	let mut seen = HashSet::new();

	for backend in &cfg.backends {
		let id = backend.id;

		if !seen.insert(id) {
			return Err(Error::validation(format!("Backend {id} is configured more than once.")));
		}
		if backend.dimensions == 0 {
			return Err(Error::validation(format!(
				"backends.{id}.dimensions must be greater than zero."
			)));
		}
		if backend.index_path.as_os_str().is_empty() {
			return Err(Error::validation(format!("backends.{id}.index_path must be non-empty.")));
		}
		if backend.catalog_path.as_os_str().is_empty() {
			return Err(Error::validation(format!(
				"backends.{id}.catalog_path must be non-empty."
			)));
		}

		validate_embedding(id.as_str(), &backend.embedding)?;
	}

	Ok(())
}

fn validate_retrieval(cfg: &Config) -> Result<()> {
	let retrieval = &cfg.retrieval;

	if retrieval.default_top_k == 0 {
		return Err(Error::validation("retrieval.default_top_k must be greater than zero."));
	}
	if retrieval.max_top_k < retrieval.default_top_k {
		return Err(Error::validation(
			"retrieval.max_top_k must be greater than or equal to retrieval.default_top_k.",
		));
	}
	if retrieval.max_events == 0 {
		return Err(Error::validation("retrieval.max_events must be greater than zero."));
	}
	if retrieval.max_concurrent_queries == 0 {
		return Err(Error::validation(
			"retrieval.max_concurrent_queries must be greater than zero.",
		));
	}
	if retrieval.sequence_timeout_ms == 0 {
		return Err(Error::validation("retrieval.sequence_timeout_ms must be greater than zero."));
	}

	Ok(())
}

fn validate_embedding(id: &str, embedding: &EmbeddingProviderConfig) -> Result<()> {
	for (label, value) in [
		("api_base", &embedding.api_base),
		("api_key", &embedding.api_key),
		("text_path", &embedding.text_path),
		("image_path", &embedding.image_path),
		("model", &embedding.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::validation(format!(
				"backends.{id}.embedding.{label} must be non-empty."
			)));
		}
	}

	if embedding.timeout_ms == 0 {
		return Err(Error::validation(format!(
			"backends.{id}.embedding.timeout_ms must be greater than zero."
		)));
	}
	if embedding.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::validation(format!(
			"backends.{id}.embedding.default_headers values must be strings."
		)));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for backend in &mut cfg.backends {
		let api_base = backend.embedding.api_base.trim().trim_end_matches('/');

		backend.embedding.api_base = api_base.to_string();
	}
}
