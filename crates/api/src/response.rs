//! Shared response envelope types for API handlers.
//!
//! Successful responses use a `{ "data": ... }` envelope; failures are
//! rendered by [`crate::error::AppError`].

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: normalized }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
