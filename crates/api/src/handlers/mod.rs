//! Request handlers.
//!
//! Handlers delegate to the shared validator in [`crate::state::AppState`]
//! and map errors via [`crate::error::AppError`].

pub mod validation;
