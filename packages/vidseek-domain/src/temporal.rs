//! Temporal correlation of per-event result sets.
//!
//! Every record of the first result set is an anchor. An anchor is accepted when each later
//! result set holds at least one frame of the same video with a strictly larger frame ordinal.
//! For an accepted anchor every record of that video is collected from all result sets, in set
//! order and then rank order. Records are not deduplicated across anchors, so two accepted
//! anchors from one video contribute that video's frames twice. The combined list is then cut to
//! its first half.

use std::collections::HashMap;

use crate::record::Record;

/// Correlates and truncates; the result of a multi-event search.
pub fn correlate_events(result_sets: &[Vec<Record>]) -> Vec<Record> {
	truncate_half(correlate(result_sets))
}

/// Builds the combined list before truncation, in discovery order.
///
/// Records whose frame id carries no ordinal cannot be placed on the timeline and are ignored.
pub fn correlate(result_sets: &[Vec<Record>]) -> Vec<Record> {
	let Some((anchors, following)) = result_sets.split_first() else {
		return Vec::new();
	};
	let peaks: Vec<HashMap<&str, u64>> = following.iter().map(|set| latest_ordinals(set)).collect();
	let mut walks: HashMap<&str, Vec<&Record>> = HashMap::new();
	let mut combined = Vec::new();

	for anchor in anchors {
		let Some(anchor_ordinal) = anchor.frame_ordinal() else {
			continue;
		};
		let video_id = anchor.video_id.as_str();
		let accepted = peaks
			.iter()
			.all(|peak| peak.get(video_id).is_some_and(|latest| *latest > anchor_ordinal));

		if !accepted {
			continue;
		}

		let walk = walks.entry(video_id).or_insert_with(|| collect_video(result_sets, video_id));

		combined.extend(walk.iter().map(|record| (*record).clone()));
	}

	combined
}

/// Keeps the first `len / 2` records.
pub fn truncate_half(mut records: Vec<Record>) -> Vec<Record> {
	let keep = records.len() / 2;

	records.truncate(keep);

	records
}

// "Some later frame exceeds the anchor" is equivalent to "the latest frame exceeds the anchor".
fn latest_ordinals(set: &[Record]) -> HashMap<&str, u64> {
	let mut latest = HashMap::new();

	for record in set {
		let Some(ordinal) = record.frame_ordinal() else {
			continue;
		};

		latest
			.entry(record.video_id.as_str())
			.and_modify(|current: &mut u64| *current = (*current).max(ordinal))
			.or_insert(ordinal);
	}

	latest
}

fn collect_video<'a>(result_sets: &'a [Vec<Record>], video_id: &str) -> Vec<&'a Record> {
	result_sets
		.iter()
		.flatten()
		.filter(|record| record.video_id == video_id && record.frame_ordinal().is_some())
		.collect()
}
