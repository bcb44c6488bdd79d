use axum::{
	Json, Router,
	body::Bytes,
	extract::{
		DefaultBodyLimit, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use vidseek_service::{
	BackendsResponse, Error as ServiceError, ImageSearchRequest, SearchRequest, SearchResponse,
	SequenceRequest,
};

use crate::state::AppState;

const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ImageSearchQuery {
	#[serde(alias = "model_type")]
	backend: String,
	top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::UnsupportedBackend { .. } => {
				Self::new(StatusCode::BAD_REQUEST, "UNSUPPORTED_BACKEND", err.to_string())
			},
			ServiceError::InvalidRequest { message } => {
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
			},
			ServiceError::MixedBackends { message } => {
				Self::new(StatusCode::BAD_REQUEST, "MIXED_BACKENDS", message)
			},
			ServiceError::EmbeddingFailure { message } => {
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, "EMBEDDING_FAILURE", message)
			},
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Embedding provider failed.");

				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", "Embedding provider failed.")
			},
			ServiceError::IndexUnavailable { backend } => {
				tracing::error!(%backend, "Request routed to a backend that failed to load.");

				Self::new(
					StatusCode::SERVICE_UNAVAILABLE,
					"INDEX_UNAVAILABLE",
					format!("Backend {backend} is unavailable."),
				)
			},
			ServiceError::DeadlineExceeded { timeout_ms } => {
				tracing::error!(timeout_ms, "Sequence retrieval timed out.");

				Self::new(
					StatusCode::GATEWAY_TIMEOUT,
					"DEADLINE_EXCEEDED",
					"Sequence retrieval exceeded its deadline.",
				)
			},
			ServiceError::DimensionMismatch { message } | ServiceError::Internal { message } => {
				tracing::error!(error = %message, "Request failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error.")
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}
impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", rejection.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/backends", get(backends))
		.route("/v1/frames/search", post(search))
		.route(
			"/v1/frames/search_by_image",
			post(search_by_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
		)
		.route("/v1/frames/sequence", post(sequence))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn backends(State(state): State<AppState>) -> Json<BackendsResponse> {
	Json(state.service.backends())
}

async fn search(
	State(state): State<AppState>,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search_text(payload).await?;

	Ok(Json(response))
}

async fn search_by_image(
	State(state): State<AppState>,
	query: Result<Query<ImageSearchQuery>, QueryRejection>,
	image: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
	let Query(query) = query?;
	let response = state
		.service
		.search_image(ImageSearchRequest {
			backend: query.backend,
			image: image.to_vec(),
			top_k: query.top_k,
		})
		.await?;

	Ok(Json(response))
}

async fn sequence(
	State(state): State<AppState>,
	payload: Result<Json<SequenceRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search_sequence(payload).await?;

	Ok(Json(response))
}
