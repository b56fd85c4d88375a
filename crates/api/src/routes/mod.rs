pub mod health;
pub mod validation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projets/validate                                 validate for creation (POST)
/// /projets/validate-changes                         validate an update (POST)
///
/// /validation/{entity}                              validate any entity kind (POST, ?mode)
///
/// /perimetres/{perimetre}                           check one perimeter (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projets", validation::projets_router())
        .nest("/validation", validation::validation_router())
        .nest("/perimetres", validation::perimetres_router())
}
