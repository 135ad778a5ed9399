pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod startup;
pub mod store;

use std::sync::Arc;

pub use config::{AppConfig, StoreBackend};
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;
pub use services::ShiftSwapService;
pub use store::SwapStore;

pub struct AppState {
    pub config: AppConfig,
    pub swaps: ShiftSwapService,
    pub metrics: Arc<MetricsState>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn SwapStore>, metrics: Arc<MetricsState>) -> Self {
        let swaps = ShiftSwapService::new(store, config.auto_complete_swaps);
        Self {
            config,
            swaps,
            metrics,
        }
    }
}
