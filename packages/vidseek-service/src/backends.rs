use serde::Serialize;

use vidseek_index::BackendSummary;

use crate::VidseekService;

#[derive(Debug, Clone, Serialize)]
pub struct BackendsResponse {
	pub data: Vec<BackendSummary>,
}

impl VidseekService {
	/// Lists configured backends and whether each one loaded.
	pub fn backends(&self) -> BackendsResponse {
		BackendsResponse { data: self.registry.summaries() }
	}
}
