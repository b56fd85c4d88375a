//! Database-backed territory registry.

use std::collections::HashSet;

use async_trait::async_trait;
use pcrs_core::territory::{Perimetre, TerritoryError, TerritoryIndex, TerritoryRegistry};

use crate::models::territoire::UpsertTerritoire;
use crate::repositories::TerritoireRepo;
use crate::DbPool;

/// Resolves perimeters against the `territoires` table.
#[derive(Debug, Clone)]
pub struct PgTerritoryRegistry {
    pool: DbPool,
}

impl PgTerritoryRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Upsert every entry of `index` a perimeter can reference.
    ///
    /// Returns the number of rows written.
    pub async fn import(&self, index: &TerritoryIndex) -> Result<u64, sqlx::Error> {
        let rows: Vec<UpsertTerritoire> = index
            .perimetres()
            .map(|(perimetre, area)| UpsertTerritoire::from_perimetre(perimetre, area))
            .collect();
        TerritoireRepo::upsert_many(&self.pool, &rows).await
    }

    /// Number of territories in the table.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        TerritoireRepo::count(&self.pool).await
    }
}

fn unavailable(err: sqlx::Error) -> TerritoryError {
    TerritoryError::Unavailable(err.to_string())
}

#[async_trait]
impl TerritoryRegistry for PgTerritoryRegistry {
    async fn ensure_exists(&self, perimetre: &Perimetre) -> Result<(), TerritoryError> {
        let found = TerritoireRepo::exists(
            &self.pool,
            perimetre.territory_type.as_str(),
            &perimetre.code,
        )
        .await
        .map_err(unavailable)?;

        if found {
            Ok(())
        } else {
            Err(TerritoryError::NotFound(perimetre.key()))
        }
    }

    async fn exists_many(&self, perimetres: &[Perimetre]) -> Result<Vec<bool>, TerritoryError> {
        if perimetres.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<(&str, &str)> = perimetres
            .iter()
            .map(|p| (p.territory_type.as_str(), p.code.as_str()))
            .collect();
        let found: HashSet<(String, String)> = TerritoireRepo::existing(&self.pool, &keys)
            .await
            .map_err(unavailable)?
            .into_iter()
            .collect();

        Ok(perimetres
            .iter()
            .map(|p| found.contains(&(p.territory_type.as_str().to_string(), p.code.clone())))
            .collect())
    }

    async fn health_check(&self) -> Result<(), TerritoryError> {
        crate::health_check(&self.pool).await.map_err(unavailable)
    }
}
