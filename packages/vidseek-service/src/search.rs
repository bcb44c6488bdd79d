use serde::{Deserialize, Serialize};

use vidseek_domain::{BackendId, EmbeddingInput, Record};

use crate::{Error, Result, VidseekService};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(alias = "model_type")]
	pub backend: String,
	#[serde(alias = "query")]
	pub text: String,
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ImageSearchRequest {
	pub backend: String,
	pub image: Vec<u8>,
	pub top_k: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub data: Vec<Record>,
}

impl VidseekService {
	pub async fn search_text(&self, req: SearchRequest) -> Result<SearchResponse> {
		let backend = crate::parse_backend(&req.backend)?;
		let text = req.text.trim();

		if text.is_empty() {
			return Err(Error::InvalidRequest { message: "text is required.".to_string() });
		}

		let top_k = self.top_k(req.top_k)?;
		let data = self.retrieve(backend, &EmbeddingInput::Text(text.to_string()), top_k).await?;

		Ok(SearchResponse { data })
	}

	pub async fn search_image(&self, req: ImageSearchRequest) -> Result<SearchResponse> {
		let backend = crate::parse_backend(&req.backend)?;

		if req.image.is_empty() {
			return Err(Error::InvalidRequest { message: "image body is required.".to_string() });
		}

		let top_k = self.top_k(req.top_k)?;
		let data = self.retrieve(backend, &EmbeddingInput::Image(req.image), top_k).await?;

		Ok(SearchResponse { data })
	}

	/// Embeds one query, searches the backend's index and resolves hits to frames.
	///
	/// Hits without a catalog entry are dropped; the rest keep their rank order.
	pub async fn retrieve(
		&self,
		backend: BackendId,
		input: &EmbeddingInput,
		top_k: usize,
	) -> Result<Vec<Record>> {
		let handle = self.backend(backend)?;
		let vector = self.embed(handle.cfg, input).await?;
		let entry = handle.entry.clone();
		let positions = tokio::task::spawn_blocking(move || entry.search(&vector, top_k))
			.await
			.map_err(|err| Error::Internal { message: format!("Index search task failed: {err}") })??;
		let records = handle.entry.catalog.resolve(&positions);

		if records.len() < positions.len() {
			tracing::warn!(
				backend = %backend,
				hits = positions.len(),
				dropped = positions.len() - records.len(),
				"Index hits without a catalog entry were dropped."
			);
		}

		tracing::debug!(
			backend = %backend,
			input = input.kind(),
			top_k,
			records = records.len(),
			"Single query retrieved."
		);

		Ok(records)
	}
}
