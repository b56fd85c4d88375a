//! Handlers for the `/projets`, `/validation` and `/perimetres` resources.
//!
//! Every handler is a thin shell over [`pcrs_core::validation::Validator`]:
//! it returns the normalised entity on success and lets
//! [`AppError`] render validation reports as HTTP 400.

use axum::extract::{Path, Query, State};
use axum::Json;
use pcrs_core::territory::TerritoryType;
use pcrs_core::validation::{EntityKind, Mode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

type Normalized = Json<DataResponse<Map<String, Value>>>;

// ── Projects ─────────────────────────────────────────────────────────

/// POST /api/v1/projets/validate
///
/// Validate a complete project submitted for creation.
pub async fn validate_projet(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Normalized> {
    let data = state.validator.validate_creation(&payload).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projets/validate-changes
///
/// Validate a partial project update. Only the supplied keys are checked.
pub async fn validate_projet_changes(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Normalized> {
    let data = state.validator.validate_changes(&payload).await?;
    Ok(Json(DataResponse { data }))
}

// ── Any entity ───────────────────────────────────────────────────────

/// Query parameters for entity validation.
#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    /// `creation` (default) or `update`.
    pub mode: Option<String>,
}

/// POST /api/v1/validation/{entity}?mode=creation|update
///
/// Validate a single entity of any kind, e.g. one livrable edited on its own.
pub async fn validate_entity(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<ValidateParams>,
    Json(payload): Json<Value>,
) -> AppResult<Normalized> {
    let kind: EntityKind = entity.parse().map_err(AppError::NotFound)?;
    let mode: Mode = match params.mode.as_deref() {
        None => Mode::default(),
        Some(mode) => mode.parse().map_err(AppError::BadRequest)?,
    };

    let data = state.validator.validate(&payload, kind, mode).await?;
    Ok(Json(DataResponse { data }))
}

// ── Perimeters ───────────────────────────────────────────────────────

/// A resolved perimeter.
#[derive(Debug, Serialize)]
pub struct PerimetreResponse {
    pub perimetre: String,
    pub territory_type: TerritoryType,
    pub code: String,
}

/// GET /api/v1/perimetres/{perimetre}
///
/// Check a single `type:code` perimeter, as the project form does while the
/// user picks territories.
pub async fn check_perimetre(
    State(state): State<AppState>,
    Path(perimetre): Path<String>,
) -> AppResult<Json<DataResponse<PerimetreResponse>>> {
    let resolved = state.validator.check_perimetre(&perimetre).await?;
    Ok(Json(DataResponse {
        data: PerimetreResponse {
            perimetre: resolved.key(),
            territory_type: resolved.territory_type,
            code: resolved.code,
        },
    }))
}
