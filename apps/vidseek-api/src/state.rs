use std::sync::Arc;

use vidseek_service::VidseekService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<VidseekService>,
}
impl AppState {
	/// Loads every configured backend; fails when none can serve.
	pub fn new(config: vidseek_config::Config) -> color_eyre::Result<Self> {
		let service = VidseekService::load(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: VidseekService) -> Self {
		Self { service: Arc::new(service) }
	}
}
