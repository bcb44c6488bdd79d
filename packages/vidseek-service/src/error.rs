use vidseek_domain::{BackendId, SequenceError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Backend {backend:?} is not supported.")]
	UnsupportedBackend { backend: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	MixedBackends { message: String },
	#[error("Embedding failed: {message}")]
	EmbeddingFailure { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Dimension mismatch: {message}")]
	DimensionMismatch { message: String },
	#[error("Backend {backend} is unavailable.")]
	IndexUnavailable { backend: BackendId },
	#[error("Sequence retrieval exceeded its {timeout_ms} ms deadline.")]
	DeadlineExceeded { timeout_ms: u64 },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// Whether the caller can fix the request to make it succeed.
	pub fn is_client_error(&self) -> bool {
		matches!(
			self,
			Self::UnsupportedBackend { .. }
				| Self::InvalidRequest { .. }
				| Self::MixedBackends { .. }
				| Self::EmbeddingFailure { .. }
		)
	}
}

impl From<vidseek_index::Error> for Error {
	fn from(err: vidseek_index::Error) -> Self {
		match err {
			vidseek_index::Error::BackendNotFound { backend } => {
				Self::UnsupportedBackend { backend: backend.to_string() }
			},
			vidseek_index::Error::BackendUnavailable { backend } => {
				Self::IndexUnavailable { backend }
			},
			vidseek_index::Error::DimensionMismatch { .. }
			| vidseek_index::Error::QueryDimension { .. } => {
				Self::DimensionMismatch { message: err.to_string() }
			},
			other => Self::Internal { message: other.to_string() },
		}
	}
}

impl From<vidseek_providers::Error> for Error {
	fn from(err: vidseek_providers::Error) -> Self {
		if err.is_input_fault() {
			Self::EmbeddingFailure { message: err.to_string() }
		} else {
			Self::Provider { message: err.to_string() }
		}
	}
}

impl From<SequenceError> for Error {
	fn from(err: SequenceError) -> Self {
		match err {
			SequenceError::Empty => Self::InvalidRequest { message: err.to_string() },
			SequenceError::MixedBackends { .. } => Self::MixedBackends { message: err.to_string() },
		}
	}
}
