use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;

use vidseek_config::EmbeddingProviderConfig;

use crate::{Error, Result, image};

const REJECTION_MESSAGE_LIMIT: usize = 256;

/// HTTP client for CLIP-style embedding servers.
///
/// One client is shared by every backend; the per-backend endpoint, model and timeout come
/// from the [`EmbeddingProviderConfig`] passed to each call.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
	client: Client,
}
impl HttpEmbedder {
	pub fn new() -> Result<Self> {
		Ok(Self { client: Client::builder().build()? })
	}

	pub async fn embed_text(&self, cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
		if text.trim().is_empty() {
			return Err(Error::InvalidInput { message: "Text query must be non-empty.".to_string() });
		}

		let url = format!("{}{}", cfg.api_base, cfg.text_path);
		let body = serde_json::json!({ "model": cfg.model, "input": [text] });
		let res = self
			.client
			.post(url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;

		read_single_embedding(res).await
	}

	pub async fn embed_image(
		&self,
		cfg: &EmbeddingProviderConfig,
		bytes: &[u8],
	) -> Result<Vec<f32>> {
		let Some(format) = image::sniff(bytes) else {
			return Err(Error::InvalidInput {
				message: "Image payload is empty or not a supported image format.".to_string(),
			});
		};
		let url = format!("{}{}", cfg.api_base, cfg.image_path);
		let res = self
			.client
			.post(url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.header(CONTENT_TYPE, format.mime())
			.query(&[("model", cfg.model.as_str())])
			.body(bytes.to_vec())
			.send()
			.await?;

		read_single_embedding(res).await
	}
}

async fn read_single_embedding(res: Response) -> Result<Vec<f32>> {
	let status = res.status();

	if is_rejection(status) {
		let mut message = res.text().await.unwrap_or_default();

		if message.len() > REJECTION_MESSAGE_LIMIT {
			let mut end = REJECTION_MESSAGE_LIMIT;

			while !message.is_char_boundary(end) {
				end -= 1;
			}

			message.truncate(end);
		}

		return Err(Error::Rejected { status: status.as_u16(), message });
	}

	let json: Value = res.error_for_status()?.json().await?;
	let vector = parse_embedding_response(json)?.into_iter().next().ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding provider returned no vectors.".to_string() }
	})?;

	l2_normalize(vector)
}

// Auth, routing and rate-limit statuses are provider faults, not query faults.
fn is_rejection(status: StatusCode) -> bool {
	status.is_client_error()
		&& !matches!(
			status,
			StatusCode::UNAUTHORIZED
				| StatusCode::FORBIDDEN
				| StatusCode::NOT_FOUND
				| StatusCode::REQUEST_TIMEOUT
				| StatusCode::TOO_MANY_REQUESTS
		)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

/// Scales the vector to unit length so inner-product search ranks by cosine similarity.
pub fn l2_normalize(mut vector: Vec<f32>) -> Result<Vec<f32>> {
	if vector.is_empty() {
		return Err(Error::InvalidResponse { message: "Embedding vector is empty.".to_string() });
	}
	if vector.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidResponse {
			message: "Embedding vector contains non-finite values.".to_string(),
		});
	}

	let norm = vector.iter().map(|value| f64::from(*value) * f64::from(*value)).sum::<f64>().sqrt();

	if norm <= f64::EPSILON {
		return Err(Error::InvalidResponse {
			message: "Embedding vector has zero magnitude.".to_string(),
		});
	}

	for value in &mut vector {
		*value = (f64::from(*value) / norm) as f32;
	}

	Ok(vector)
}
