use serde::{Deserialize, Serialize};

/// Row id inside a single backend's vector index.
pub type IndexPosition = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
	pub video_id: String,
	pub frame_id: String,
}
impl Record {
	pub fn new(video_id: impl Into<String>, frame_id: impl Into<String>) -> Self {
		Self { video_id: video_id.into(), frame_id: frame_id.into() }
	}

	/// Position of the frame inside its video, if the frame id carries one.
	pub fn frame_ordinal(&self) -> Option<u64> {
		parse_frame_ordinal(&self.frame_id)
	}
}

/// Reads the numeric prefix before the first `.` of a frame id, so `"42.jpg"` yields 42.
pub fn parse_frame_ordinal(frame_id: &str) -> Option<u64> {
	let prefix = frame_id.split('.').next()?.trim();

	prefix.parse().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_numeric_prefix() {
		assert_eq!(parse_frame_ordinal("42.jpg"), Some(42));
		assert_eq!(parse_frame_ordinal("007.webp"), Some(7));
		assert_eq!(parse_frame_ordinal("15"), Some(15));
		assert_eq!(parse_frame_ordinal("3.tar.gz"), Some(3));
	}

	#[test]
	fn rejects_frames_without_ordinal() {
		assert_eq!(parse_frame_ordinal(""), None);
		assert_eq!(parse_frame_ordinal("keyframe.jpg"), None);
		assert_eq!(parse_frame_ordinal(".jpg"), None);
		assert_eq!(parse_frame_ordinal("-4.jpg"), None);
	}

	#[test]
	fn serializes_as_video_and_frame() {
		let record = Record::new("L01_V001", "120.jpg");
		let json = serde_json::to_value(&record).expect("Failed to serialize record.");

		assert_eq!(json, serde_json::json!({ "video_id": "L01_V001", "frame_id": "120.jpg" }));
		assert_eq!(record.frame_ordinal(), Some(120));
	}
}
