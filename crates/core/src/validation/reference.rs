//! External reference validation for project perimeters.
//!
//! The type prefix is checked synchronously by [`parse_perimetre`] so that
//! malformed input never reaches the registry. Existence is then resolved
//! through the injected [`TerritoryRegistry`], bounded by a timeout.

use std::fmt;
use std::time::Duration;

use super::messages::MessageKey;
use crate::territory::{Perimetre, TerritoryError, TerritoryRegistry, TerritoryType};

/// User-facing reason a perimeter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFailure {
    /// The prefix is not one of `epci`, `departement`, `commune`.
    MalformedType,
    /// The registry does not know the territory.
    NotFound,
    /// The registry did not answer in time.
    TimedOut,
}

impl ReferenceFailure {
    pub fn key(&self) -> MessageKey {
        match self {
            Self::MalformedType => MessageKey::PerimetreType,
            Self::NotFound => MessageKey::PerimetreNotFound,
            Self::TimedOut => MessageKey::PerimetreTimeout,
        }
    }
}

impl fmt::Display for ReferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().default_message())
    }
}

/// Outcome of a failed resolution.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// The perimeter is invalid; reported back to the caller.
    #[error("{0}")]
    Invalid(ReferenceFailure),

    /// The registry itself failed; not the caller's fault.
    #[error("Territory registry unavailable: {0}")]
    Unavailable(String),
}

/// Split `type:code` and check the territory type.
pub fn parse_perimetre(value: &str) -> Result<Perimetre, ReferenceFailure> {
    let (prefix, code) = value.split_once(':').unwrap_or((value, ""));
    let territory_type = prefix
        .parse::<TerritoryType>()
        .map_err(|()| ReferenceFailure::MalformedType)?;
    Ok(Perimetre::new(territory_type, code))
}

/// Parse and resolve one perimeter string.
pub async fn resolve_reference(
    registry: &dyn TerritoryRegistry,
    value: &str,
    timeout: Duration,
) -> Result<Perimetre, ReferenceError> {
    let perimetre = parse_perimetre(value).map_err(ReferenceError::Invalid)?;
    ensure_exists(registry, &perimetre, timeout).await?;
    Ok(perimetre)
}

/// Resolve an already-parsed perimeter.
pub async fn ensure_exists(
    registry: &dyn TerritoryRegistry,
    perimetre: &Perimetre,
    timeout: Duration,
) -> Result<(), ReferenceError> {
    match tokio::time::timeout(timeout, registry.ensure_exists(perimetre)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(TerritoryError::NotFound(_))) => {
            Err(ReferenceError::Invalid(ReferenceFailure::NotFound))
        }
        Ok(Err(TerritoryError::Unavailable(reason))) => {
            tracing::warn!(perimetre = %perimetre, %reason, "Territory registry unavailable");
            Err(ReferenceError::Unavailable(reason))
        }
        Err(_) => {
            tracing::warn!(
                perimetre = %perimetre,
                timeout_ms = timeout.as_millis() as u64,
                "Territory lookup timed out"
            );
            Err(ReferenceError::Invalid(ReferenceFailure::TimedOut))
        }
    }
}

/// Resolve many perimeters with one batched registry call.
///
/// Results are returned in input order. The timeout bounds the whole batch;
/// when it elapses every perimeter is reported as timed out.
pub async fn resolve_all(
    registry: &dyn TerritoryRegistry,
    perimetres: &[Perimetre],
    timeout: Duration,
) -> Result<Vec<Result<(), ReferenceFailure>>, ReferenceError> {
    match tokio::time::timeout(timeout, registry.exists_many(perimetres)).await {
        Ok(Ok(found)) if found.len() == perimetres.len() => Ok(found
            .into_iter()
            .map(|exists| {
                if exists {
                    Ok(())
                } else {
                    Err(ReferenceFailure::NotFound)
                }
            })
            .collect()),
        Ok(Ok(found)) => {
            let reason = format!(
                "registry answered {} of {} lookups",
                found.len(),
                perimetres.len()
            );
            tracing::warn!(%reason, "Territory registry returned a short batch");
            Err(ReferenceError::Unavailable(reason))
        }
        Ok(Err(err)) => {
            let reason = match err {
                TerritoryError::Unavailable(reason) => reason,
                other => other.to_string(),
            };
            tracing::warn!(lookups = perimetres.len(), %reason, "Territory registry unavailable");
            Err(ReferenceError::Unavailable(reason))
        }
        Err(_) => {
            tracing::warn!(
                lookups = perimetres.len(),
                timeout_ms = timeout.as_millis() as u64,
                "Territory lookups timed out"
            );
            Ok(vec![Err(ReferenceFailure::TimedOut); perimetres.len()])
        }
    }
}
