use std::path::PathBuf;

use vidseek_domain::BackendId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path:?}.")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Index file {path:?} is malformed: {message}")]
	MalformedIndex { path: PathBuf, message: String },
	#[error("Failed to parse record catalog {path:?}: {source}")]
	ParseCatalog { path: PathBuf, source: serde_json::Error },
	#[error("Index rows must all have {expected} dimensions; row {row} has {actual}.")]
	InvalidRow { row: usize, expected: usize, actual: usize },
	#[error("Index dimensions must be greater than zero.")]
	ZeroDimensions,
	#[error("Query vector has {actual} dimensions but the index expects {expected}.")]
	QueryDimension { expected: usize, actual: usize },
	#[error("Query vector has {actual} dimensions but backend {backend} expects {expected}.")]
	DimensionMismatch { backend: BackendId, expected: usize, actual: usize },
	#[error("Backend {backend} index has {actual} dimensions but is configured for {expected}.")]
	ConfiguredDimension { backend: BackendId, expected: usize, actual: usize },
	#[error("Backend {backend} is not configured.")]
	BackendNotFound { backend: BackendId },
	#[error("Backend {backend} failed to load at startup.")]
	BackendUnavailable { backend: BackendId },
	#[error("Failed to load backend {backend}: {source}")]
	BackendLoad { backend: BackendId, source: Box<Error> },
	#[error("No configured backend could be loaded.")]
	NoBackends,
}
