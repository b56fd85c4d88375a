use crate::validation::report::ValidationReport;
use crate::validation::schema::{EntityKind, Mode};

/// Errors surfaced by the validator.
///
/// [`CoreError::Invalid`] is the only user-facing variant: it carries every
/// issue found in the payload and is expected to become a 400 response.
/// The remaining variants are internal failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Invalid(ValidationReport),

    #[error("No schema registered for {kind} in {mode} mode")]
    UnknownSchema { kind: EntityKind, mode: Mode },

    #[error("Territory lookup failed: {0}")]
    TerritoryLookup(String),
}

impl CoreError {
    /// Whether this error describes bad input rather than a server fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The validation report, if this is a validation failure.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Invalid(report) => Some(report),
            _ => None,
        }
    }
}
