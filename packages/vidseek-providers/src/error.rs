pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidInput { message: String },
	#[error("Embedding provider rejected the query with status {status}: {message}")]
	Rejected { status: u16, message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
impl Error {
	/// Whether the failure was caused by the query itself rather than the provider.
	pub fn is_input_fault(&self) -> bool {
		matches!(self, Self::InvalidInput { .. } | Self::Rejected { .. })
	}
}
