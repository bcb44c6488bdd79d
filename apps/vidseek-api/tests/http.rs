use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use vidseek_api::{routes, state::AppState};
use vidseek_config::EmbeddingProviderConfig;
use vidseek_domain::BackendId;
use vidseek_index::{BackendEntry, BackendRegistry, RecordCatalog};
use vidseek_service::{BoxFuture, EmbeddingProvider, Providers, VidseekService};
use vidseek_testkit::{FixedIndex, TestDir, backend_config, records, test_config};

const DIMENSIONS: usize = 3;
const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct StubEmbedding;
impl EmbeddingProvider for StubEmbedding {
	fn embed_text<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>> {
		Box::pin(async move {
			match text {
				"unreadable" => Err(vidseek_providers::Error::Rejected {
					status: 422,
					message: "query too long".to_string(),
				}),
				"offline" => Err(vidseek_providers::Error::InvalidResponse {
					message: "upstream returned HTML".to_string(),
				}),
				_ => Ok(vec![1.0, 0.0, 0.0]),
			}
		})
	}

	fn embed_image<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_image: &'a [u8],
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>> {
		Box::pin(async { Ok(vec![0.0, 1.0, 0.0]) })
	}
}

fn app() -> Router {
	let cfg = test_config(vec![
		backend_config(BackendId::Original, "original.vsi".into(), "original.json".into(), 3),
		backend_config(BackendId::Laion, "laion.vsi".into(), "laion.json".into(), 3),
	]);
	let catalog = RecordCatalog::from_records(records(&[
		(0, "L01_V001", "10.jpg"),
		(1, "L01_V001", "20.jpg"),
		(2, "L02_V007", "3.jpg"),
		(3, "L01_V001", "30.jpg"),
	]));
	let mut registry = BackendRegistry::new();

	registry.insert(BackendEntry::new(
		BackendId::Original,
		Arc::new(FixedIndex::new(DIMENSIONS, vec![0, 2, 1, 3])),
		Arc::new(catalog),
	));
	registry.mark_unavailable(BackendId::Laion, "index file missing");

	let service =
		VidseekService::with_providers(cfg, registry, Providers::new(Arc::new(StubEmbedding)));

	routes::router(AppState::from_service(service))
}

fn json_request(uri: &str, payload: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let (status, _) = send(
		app(),
		Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lists_backends_with_load_status() {
	let (status, json) = send(
		app(),
		Request::builder()
			.uri("/v1/backends")
			.body(Body::empty())
			.expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		json,
		serde_json::json!({
			"data": [
				{ "backend": "original", "status": "ready", "dimensions": 3, "records": 4 },
				{ "backend": "laion", "status": "unavailable", "dimensions": null, "records": null }
			]
		})
	);
}

#[tokio::test]
async fn text_search_returns_ranked_frames() {
	let (status, json) = send(
		app(),
		json_request(
			"/v1/frames/search",
			serde_json::json!({ "backend": "original_clip", "text": "a red car", "top_k": 2 }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(
		json,
		serde_json::json!({
			"data": [
				{ "video_id": "L01_V001", "frame_id": "10.jpg" },
				{ "video_id": "L02_V007", "frame_id": "3.jpg" }
			]
		})
	);
}

#[tokio::test]
async fn image_search_reads_raw_body() {
	let request = Request::builder()
		.method("POST")
		.uri("/v1/frames/search_by_image?backend=original&top_k=1")
		.header("content-type", "image/png")
		.body(Body::from(PNG_HEADER))
		.expect("Failed to build request.");
	let (status, json) = send(app(), request).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"], serde_json::json!([{ "video_id": "L01_V001", "frame_id": "10.jpg" }]));
}

#[tokio::test]
async fn sequence_search_correlates_events() {
	let (status, json) = send(
		app(),
		json_request(
			"/v1/frames/sequence",
			serde_json::json!({
				"backend": "original",
				"events": ["a man opens a door", "the man walks outside"],
				"top_k": 4
			}),
		),
	)
	.await;

	// Each event sees frames 10, 3, 20 and 30; anchors 10 and 20 of L01_V001 are accepted.
	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["data"].as_array().map(Vec::len), Some(6));
	assert_eq!(json["data"][0], serde_json::json!({ "video_id": "L01_V001", "frame_id": "10.jpg" }));
}

#[tokio::test]
async fn client_errors_are_reported_with_codes() {
	let cases = [
		(
			"/v1/frames/search",
			serde_json::json!({ "backend": "clip_vit_b32", "text": "a red car" }),
			StatusCode::BAD_REQUEST,
			"UNSUPPORTED_BACKEND",
		),
		(
			"/v1/frames/search",
			serde_json::json!({ "backend": "original", "text": "  " }),
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
		),
		(
			"/v1/frames/sequence",
			serde_json::json!({ "backend": "original", "events": [] }),
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
		),
		(
			"/v1/frames/search",
			serde_json::json!({ "backend": "original", "text": "unreadable" }),
			StatusCode::UNPROCESSABLE_ENTITY,
			"EMBEDDING_FAILURE",
		),
		(
			"/v1/frames/search",
			serde_json::json!({ "backend": "original" }),
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
		),
		(
			"/v1/frames/sequence",
			serde_json::json!({ "backend": "original", "events": "not a list" }),
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
		),
	];

	for (uri, payload, expected_status, expected_code) in cases {
		let (status, json) = send(app(), json_request(uri, payload)).await;

		assert_eq!(status, expected_status, "Unexpected status for {uri}: {json}");
		assert_eq!(json["error_code"], expected_code);
	}
}

#[tokio::test]
async fn malformed_image_query_is_a_json_error() {
	let request = Request::builder()
		.method("POST")
		.uri("/v1/frames/search_by_image")
		.header("content-type", "image/png")
		.body(Body::from(PNG_HEADER))
		.expect("Failed to build request.");
	let (status, json) = send(app(), request).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert!(json["message"].as_str().is_some_and(|message| message.contains("backend")));
}

#[tokio::test]
async fn server_errors_hide_details() {
	let (status, json) = send(
		app(),
		json_request(
			"/v1/frames/search",
			serde_json::json!({ "backend": "original", "text": "offline" }),
		),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(json["error_code"], "PROVIDER_ERROR");
	assert!(!json["message"].as_str().unwrap_or_default().contains("HTML"));

	let (status, json) = send(
		app(),
		json_request("/v1/frames/search", serde_json::json!({ "backend": "laion", "text": "a" })),
	)
	.await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "INDEX_UNAVAILABLE");
}

#[tokio::test]
async fn app_state_loads_backends_from_disk() {
	let dir = TestDir::new("vidseek_api").expect("Failed to create test dir.");
	let index_path = dir
		.write_index("original.vsi", 3, &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])
		.expect("Failed to write index.");
	let catalog_path = dir
		.write_catalog("original.json", &[(0, "L01_V001", "1.jpg"), (1, "L01_V002", "2.jpg")])
		.expect("Failed to write catalog.");
	let cfg = test_config(vec![backend_config(BackendId::Original, index_path, catalog_path, 3)]);
	let state = AppState::new(cfg).expect("Failed to initialize app state.");
	let summaries = state.service.backends().data;

	assert_eq!(summaries.len(), 1);
	assert_eq!(summaries[0].records, Some(2));

	let missing = test_config(vec![backend_config(
		BackendId::Apple,
		dir.path().join("missing.vsi"),
		dir.path().join("missing.json"),
		3,
	)]);

	assert!(AppState::new(missing).is_err());
}
