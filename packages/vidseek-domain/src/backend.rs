use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One embedding model paired with the vector index built from its embeddings.
///
/// Vectors produced by one backend must only ever be searched against that backend's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
	#[serde(alias = "original_clip")]
	Original,
	#[serde(alias = "apple_clip")]
	Apple,
	#[serde(alias = "laion_clip")]
	Laion,
}
impl BackendId {
	pub const ALL: [Self; 3] = [Self::Original, Self::Apple, Self::Laion];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Original => "original",
			Self::Apple => "apple",
			Self::Laion => "laion",
		}
	}
}
impl fmt::Display for BackendId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for BackendId {
	type Err = UnknownBackend;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim() {
			"original" | "original_clip" => Ok(Self::Original),
			"apple" | "apple_clip" => Ok(Self::Apple),
			"laion" | "laion_clip" => Ok(Self::Laion),
			other => Err(UnknownBackend { value: other.to_string() }),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Backend {value:?} is not supported.")]
pub struct UnknownBackend {
	pub value: String,
}
