pub mod backends;
pub mod search;
pub mod sequence;

mod error;

pub use backends::BackendsResponse;
pub use error::{Error, Result};
pub use search::{ImageSearchRequest, SearchRequest, SearchResponse};
pub use sequence::SequenceRequest;

use std::{future::Future, pin::Pin, sync::Arc};

use vidseek_config::{Backend, Config, EmbeddingProviderConfig};
use vidseek_domain::{BackendId, EmbeddingInput};
use vidseek_index::{BackendEntry, BackendRegistry};
use vidseek_providers::HttpEmbedder;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns a text or image query into the vector space of one backend.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>>;

	fn embed_image<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	/// Providers backed by the HTTP embedding client.
	pub fn http() -> vidseek_providers::Result<Self> {
		Ok(Self::new(Arc::new(DefaultProviders { http: HttpEmbedder::new()? })))
	}
}

struct DefaultProviders {
	http: HttpEmbedder,
}
impl EmbeddingProvider for DefaultProviders {
	fn embed_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>> {
		Box::pin(self.http.embed_text(cfg, text))
	}

	fn embed_image<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		image: &'a [u8],
	) -> BoxFuture<'a, vidseek_providers::Result<Vec<f32>>> {
		Box::pin(self.http.embed_image(cfg, image))
	}
}

/// Frame retrieval over every loaded backend.
///
/// Cloning is cheap; clones share the configuration, the loaded indices and the providers.
#[derive(Clone)]
pub struct VidseekService {
	pub cfg: Arc<Config>,
	pub registry: Arc<BackendRegistry>,
	pub providers: Providers,
}
impl VidseekService {
	pub fn new(cfg: Config, registry: BackendRegistry) -> Result<Self> {
		let providers = Providers::http()?;

		Ok(Self::with_providers(cfg, registry, providers))
	}

	pub fn with_providers(cfg: Config, registry: BackendRegistry, providers: Providers) -> Self {
		Self { cfg: Arc::new(cfg), registry: Arc::new(registry), providers }
	}

	/// Loads every configured backend and wires the HTTP providers.
	pub fn load(cfg: Config) -> Result<Self> {
		let registry =
			BackendRegistry::load(&cfg.backends, cfg.retrieval.require_all_backends)?;

		Self::new(cfg, registry)
	}

	/// Resolves a backend to its embedding settings and loaded index.
	///
	/// Fails before any embedding or index work when the backend is not configured.
	pub(crate) fn backend(&self, id: BackendId) -> Result<BackendHandle<'_>> {
		let Some(cfg) = self.cfg.backend(id) else {
			return Err(Error::UnsupportedBackend { backend: id.to_string() });
		};
		let entry = self.registry.entry(id)?;

		Ok(BackendHandle { cfg, entry })
	}

	pub(crate) async fn embed(&self, cfg: &Backend, input: &EmbeddingInput) -> Result<Vec<f32>> {
		let vector = match input {
			EmbeddingInput::Text(text) => {
				self.providers.embedding.embed_text(&cfg.embedding, text).await?
			},
			EmbeddingInput::Image(bytes) => {
				self.providers.embedding.embed_image(&cfg.embedding, bytes).await?
			},
		};

		Ok(vector)
	}

	/// Resolves the requested result count against the configured default and ceiling.
	pub(crate) fn top_k(&self, requested: Option<u32>) -> Result<usize> {
		let retrieval = &self.cfg.retrieval;
		let top_k = requested.unwrap_or(retrieval.default_top_k);

		if top_k == 0 {
			return Err(Error::InvalidRequest {
				message: "top_k must be greater than zero.".to_string(),
			});
		}
		if top_k > retrieval.max_top_k {
			return Err(Error::InvalidRequest {
				message: format!("top_k must be at most {}.", retrieval.max_top_k),
			});
		}

		Ok(top_k as usize)
	}
}

pub(crate) struct BackendHandle<'a> {
	pub(crate) cfg: &'a Backend,
	pub(crate) entry: &'a BackendEntry,
}

pub(crate) fn parse_backend(value: &str) -> Result<BackendId> {
	value.parse().map_err(|_| Error::UnsupportedBackend { backend: value.trim().to_string() })
}
