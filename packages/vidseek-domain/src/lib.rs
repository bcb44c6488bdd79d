pub mod backend;
pub mod event;
pub mod record;
pub mod temporal;

pub use backend::{BackendId, UnknownBackend};
pub use event::{EmbeddingInput, EventQuery, EventSequence, SequenceError};
pub use record::{IndexPosition, Record, parse_frame_ordinal};
