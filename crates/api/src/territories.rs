//! Startup wiring for the territory registry.

use std::path::Path;
use std::sync::Arc;

use pcrs_core::territory::{TerritoryIndex, TerritoryIndexError, TerritoryRegistry};
use pcrs_db::PgTerritoryRegistry;

use crate::config::TerritorySource;

/// Failure to bring up the configured territory registry.
#[derive(Debug, thiserror::Error)]
pub enum TerritorySetupError {
    #[error("Failed to load territory index from {path}: {source}")]
    Index {
        path: String,
        source: TerritoryIndexError,
    },

    #[error("Territory database unavailable: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn load_index(path: &Path) -> Result<TerritoryIndex, TerritorySetupError> {
    TerritoryIndex::load(path).map_err(|err| TerritorySetupError::Index {
        path: path.display().to_string(),
        source: err,
    })
}

/// Open the registry named by `source`.
///
/// A file source is read once into memory. A database source is connected,
/// health-checked and migrated before use, then seeded from its index file
/// when one is configured.
pub async fn connect(
    source: &TerritorySource,
) -> Result<Arc<dyn TerritoryRegistry>, TerritorySetupError> {
    match source {
        TerritorySource::File(path) => {
            let index = load_index(path)?;
            if index.is_empty() {
                tracing::warn!(path = %path.display(), "Territory index is empty");
            }
            tracing::info!(territories = index.len(), path = %path.display(), "Territory index loaded");
            Ok(Arc::new(index))
        }
        TerritorySource::Database { url, seed } => {
            let pool = pcrs_db::create_pool(url).await?;
            tracing::info!("Database connection pool created");

            pcrs_db::health_check(&pool).await?;
            tracing::info!("Database health check passed");

            pcrs_db::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            let registry = PgTerritoryRegistry::new(pool);
            if let Some(path) = seed {
                let index = load_index(path)?;
                let written = registry.import(&index).await?;
                tracing::info!(written, path = %path.display(), "Territory table seeded");
            }

            let territories = registry.count().await?;
            if territories == 0 {
                tracing::warn!("Territory table is empty; every perimeter will be rejected");
            }
            tracing::info!(territories, "Territory table ready");
            Ok(Arc::new(registry))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pcrs_core::territory::{Perimetre, TerritoryType};

    use super::*;

    #[tokio::test]
    async fn file_source_loads_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"territory": "communes:75056", "area": 105.4}}, {{"territory": "departements:75"}}]"#
        )
        .unwrap();

        let registry = connect(&TerritorySource::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert!(registry
            .ensure_exists(&Perimetre::new(TerritoryType::Commune, "75056"))
            .await
            .is_ok());
        assert!(registry
            .ensure_exists(&Perimetre::new(TerritoryType::Departement, "75"))
            .await
            .is_ok());
        assert!(registry.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let result = connect(&TerritorySource::File("/nonexistent/superficies.json".into())).await;
        assert!(matches!(result, Err(TerritorySetupError::Index { .. })));
    }
}
