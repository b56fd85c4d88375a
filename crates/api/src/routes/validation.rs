//! Route definitions for the `/projets`, `/validation` and `/perimetres`
//! resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::validation;
use crate::state::AppState;

/// Routes mounted at `/projets`.
///
/// ```text
/// POST   /validate          -> validate_projet          (creation)
/// POST   /validate-changes  -> validate_projet_changes  (update)
/// ```
pub fn projets_router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validation::validate_projet))
        .route("/validate-changes", post(validation::validate_projet_changes))
}

/// Routes mounted at `/validation`.
///
/// ```text
/// POST   /{entity}          -> validate_entity  (?mode=creation|update)
/// ```
pub fn validation_router() -> Router<AppState> {
    Router::new().route("/{entity}", post(validation::validate_entity))
}

/// Routes mounted at `/perimetres`.
///
/// ```text
/// GET    /{perimetre}       -> check_perimetre
/// ```
pub fn perimetres_router() -> Router<AppState> {
    Router::new().route("/{perimetre}", get(validation::check_perimetre))
}
