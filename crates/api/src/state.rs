use std::sync::Arc;

use kazi_core::payment::PaymentTrigger;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: kazi_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<kazi_events::EventBus>,
    /// Fired once for every session that reaches `completed`.
    pub payment_trigger: Arc<dyn PaymentTrigger>,
}
