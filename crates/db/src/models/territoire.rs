//! Territory DTOs.

use pcrs_core::territory::Perimetre;
use serde::Deserialize;

/// DTO for inserting or refreshing a territory.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTerritoire {
    pub territory_type: String,
    pub code: String,
    pub nom: Option<String>,
    pub area_km2: Option<f64>,
}

impl UpsertTerritoire {
    /// Row for a perimeter taken from a territory index.
    pub fn from_perimetre(perimetre: Perimetre, area_km2: Option<f64>) -> Self {
        Self {
            territory_type: perimetre.territory_type.as_str().to_string(),
            code: perimetre.code,
            nom: None,
            area_km2,
        }
    }
}
