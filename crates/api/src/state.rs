use std::sync::Arc;

use pcrs_core::validation::Validator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Project validator, wired to the configured territory registry.
    pub validator: Arc<Validator>,
}
