pub mod classify;
pub mod health;
pub mod metrics_handler;
pub mod probe;

use crate::{classifier::PricingTable, config::ProviderConfig, providers::VisionProvider};
use std::sync::Arc;

/// Application state shared by all handlers; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn VisionProvider>,
    pub pricing: Arc<PricingTable>,
    pub settings: Arc<ProviderConfig>,
}
