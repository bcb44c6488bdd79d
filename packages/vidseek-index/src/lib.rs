pub mod catalog;
pub mod flat;
pub mod registry;

mod error;

pub use catalog::RecordCatalog;
pub use error::Error;
pub use flat::FlatIndex;
pub use registry::{BackendEntry, BackendRegistry, BackendStatus, BackendSummary};

use vidseek_domain::IndexPosition;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// File signature of a serialized [`FlatIndex`].
pub const INDEX_MAGIC: &[u8; 4] = b"VSI1";

/// Read-only nearest-neighbor index over one backend's frame embeddings.
///
/// Implementations must be safe to search from many requests at once without locking.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn dimensions(&self) -> usize;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns at most `k` positions, best match first.
	fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexPosition>>;
}
