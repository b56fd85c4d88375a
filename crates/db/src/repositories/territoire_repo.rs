//! Repository for the `territoires` table.

use sqlx::PgPool;

use crate::models::territoire::UpsertTerritoire;

/// Provides lookups and bulk upserts for territories.
pub struct TerritoireRepo;

impl TerritoireRepo {
    /// Insert territories, or refresh the name and area of those that exist.
    ///
    /// Runs as a single statement; `(territory_type, code)` must be unique
    /// within `rows`. Returns the number of rows written.
    pub async fn upsert_many(pool: &PgPool, rows: &[UpsertTerritoire]) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let territory_types: Vec<&str> = rows.iter().map(|r| r.territory_type.as_str()).collect();
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        let noms: Vec<Option<&str>> = rows.iter().map(|r| r.nom.as_deref()).collect();
        let areas: Vec<Option<f64>> = rows.iter().map(|r| r.area_km2).collect();

        let result = sqlx::query(
            "INSERT INTO territoires (territory_type, code, nom, area_km2)
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::float8[])
             ON CONFLICT (territory_type, code) DO UPDATE SET
                nom = EXCLUDED.nom,
                area_km2 = EXCLUDED.area_km2,
                updated_at = NOW()",
        )
        .bind(&territory_types)
        .bind(&codes)
        .bind(&noms)
        .bind(&areas)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Whether a territory with this type and code exists.
    pub async fn exists(pool: &PgPool, territory_type: &str, code: &str) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM territoires WHERE territory_type = $1 AND code = $2)",
        )
        .bind(territory_type)
        .bind(code)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// The `(territory_type, code)` pairs among `keys` that exist.
    pub async fn existing(
        pool: &PgPool,
        keys: &[(&str, &str)],
    ) -> Result<Vec<(String, String)>, sqlx::Error> {
        let territory_types: Vec<&str> = keys.iter().map(|(t, _)| *t).collect();
        let codes: Vec<&str> = keys.iter().map(|(_, c)| *c).collect();

        sqlx::query_as(
            "SELECT t.territory_type, t.code
             FROM territoires t
             JOIN UNNEST($1::text[], $2::text[]) AS k(territory_type, code)
               ON t.territory_type = k.territory_type AND t.code = k.code",
        )
        .bind(&territory_types)
        .bind(&codes)
        .fetch_all(pool)
        .await
    }

    /// Number of known territories.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM territoires")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
