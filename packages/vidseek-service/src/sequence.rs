use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use uuid::Uuid;

use vidseek_domain::{BackendId, EmbeddingInput, EventQuery, EventSequence, Record, temporal};

use crate::{Error, Result, SearchResponse, VidseekService};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRequest {
	#[serde(alias = "model_type")]
	pub backend: String,
	#[serde(alias = "list_event")]
	pub events: Vec<String>,
	pub top_k: Option<u32>,
	pub timeout_ms: Option<u64>,
}

impl VidseekService {
	pub async fn search_sequence(&self, req: SequenceRequest) -> Result<SearchResponse> {
		let backend = crate::parse_backend(&req.backend)?;

		if req.events.is_empty() {
			return Err(Error::InvalidRequest { message: "events must not be empty.".to_string() });
		}
		if req.events.len() > self.cfg.retrieval.max_events as usize {
			return Err(Error::InvalidRequest {
				message: format!("At most {} events are allowed.", self.cfg.retrieval.max_events),
			});
		}
		if let Some(position) = req.events.iter().position(|event| event.trim().is_empty()) {
			return Err(Error::InvalidRequest {
				message: format!("events[{position}] must not be empty."),
			});
		}

		let top_k = self.top_k(req.top_k)?;
		let deadline = self.deadline(req.timeout_ms)?;
		let events = req
			.events
			.iter()
			.map(|event| EventQuery::text(backend, event.trim()))
			.collect();
		let data = self.retrieve_events(events, top_k, deadline).await?;

		Ok(SearchResponse { data })
	}

	/// Runs one sub-query per event and correlates the results along each video's timeline.
	///
	/// All events must target the same backend. Sub-queries run concurrently up to
	/// `retrieval.max_concurrent_queries`. When `deadline` elapses the pending sub-queries are
	/// abandoned and no partial result is returned; an index search already running on the
	/// blocking pool still finishes in the background and its result is dropped.
	pub async fn retrieve_events(
		&self,
		events: Vec<EventQuery>,
		top_k: usize,
		deadline: Duration,
	) -> Result<Vec<Record>> {
		let sequence = EventSequence::new(events)?;
		let backend = sequence.backend();
		let request_id = Uuid::new_v4();

		self.backend(backend)?;

		let event_count = sequence.len();
		let result_sets = match tokio::time::timeout(
			deadline,
			self.run_sub_queries(backend, sequence.into_events(), top_k),
		)
		.await
		{
			Ok(result_sets) => result_sets?,
			Err(_) => {
				tracing::warn!(
					%request_id,
					backend = %backend,
					events = event_count,
					timeout_ms = deadline.as_millis() as u64,
					"Sequence retrieval exceeded its deadline."
				);

				return Err(Error::DeadlineExceeded { timeout_ms: deadline.as_millis() as u64 });
			},
		};
		let records = temporal::correlate_events(&result_sets);

		tracing::debug!(
			%request_id,
			backend = %backend,
			events = event_count,
			hits = ?result_sets.iter().map(Vec::len).collect::<Vec<_>>(),
			records = records.len(),
			"Sequence correlated."
		);

		Ok(records)
	}

	async fn run_sub_queries(
		&self,
		backend: BackendId,
		events: Vec<EmbeddingInput>,
		top_k: usize,
	) -> Result<Vec<Vec<Record>>> {
		let permits =
			Arc::new(Semaphore::new(self.cfg.retrieval.max_concurrent_queries.max(1) as usize));
		let mut result_sets = vec![Vec::new(); events.len()];
		let mut tasks = JoinSet::new();

		for (position, input) in events.into_iter().enumerate() {
			let service = self.clone();
			let permits = permits.clone();

			tasks.spawn(async move {
				let _permit = permits.acquire_owned().await.map_err(|err| Error::Internal {
					message: format!("Sub-query limiter closed: {err}"),
				})?;
				let records = service.retrieve(backend, &input, top_k).await?;

				Ok::<_, Error>((position, records))
			});
		}

		// Dropping the set on an early return aborts the remaining sub-queries.
		while let Some(joined) = tasks.join_next().await {
			let (position, records) = joined.map_err(|err| Error::Internal {
				message: format!("Sub-query task failed: {err}"),
			})??;

			result_sets[position] = records;
		}

		Ok(result_sets)
	}

	fn deadline(&self, requested: Option<u64>) -> Result<Duration> {
		let ceiling = self.cfg.retrieval.sequence_timeout_ms;
		let timeout_ms = match requested {
			Some(0) => {
				return Err(Error::InvalidRequest {
					message: "timeout_ms must be greater than zero.".to_string(),
				});
			},
			Some(timeout_ms) => timeout_ms.min(ceiling),
			None => ceiling,
		};

		Ok(Duration::from_millis(timeout_ms))
	}
}
