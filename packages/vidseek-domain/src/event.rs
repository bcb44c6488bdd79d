use crate::backend::BackendId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingInput {
	Text(String),
	Image(Vec<u8>),
}
impl EmbeddingInput {
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Text(_) => "text",
			Self::Image(_) => "image",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
	pub backend: BackendId,
	pub input: EmbeddingInput,
}
impl EventQuery {
	pub fn text(backend: BackendId, text: impl Into<String>) -> Self {
		Self { backend, input: EmbeddingInput::Text(text.into()) }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
	#[error("Event sequence must contain at least one event.")]
	Empty,
	#[error(
		"Event {position} uses backend {found} but the sequence runs on {expected}; one sequence must use a single backend."
	)]
	MixedBackends { expected: BackendId, found: BackendId, position: usize },
}

/// Ordered sub-events that must appear in this order inside one video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSequence {
	backend: BackendId,
	events: Vec<EmbeddingInput>,
}
impl EventSequence {
	pub fn new(events: Vec<EventQuery>) -> Result<Self, SequenceError> {
		let Some(first) = events.first() else {
			return Err(SequenceError::Empty);
		};
		let backend = first.backend;

		if let Some((position, mismatch)) =
			events.iter().enumerate().find(|(_, event)| event.backend != backend)
		{
			return Err(SequenceError::MixedBackends {
				expected: backend,
				found: mismatch.backend,
				position,
			});
		}

		Ok(Self { backend, events: events.into_iter().map(|event| event.input).collect() })
	}

	pub fn from_texts<I, S>(backend: BackendId, texts: I) -> Result<Self, SequenceError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(texts.into_iter().map(|text| EventQuery::text(backend, text)).collect())
	}

	pub fn backend(&self) -> BackendId {
		self.backend
	}

	pub fn events(&self) -> &[EmbeddingInput] {
		&self.events
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn into_events(self) -> Vec<EmbeddingInput> {
		self.events
	}
}
