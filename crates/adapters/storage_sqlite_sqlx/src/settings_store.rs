//! `SQLite` implementation of [`SettingsStore`].

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use patchwork_app::ports::SettingsStore;
use patchwork_domain::automation::Automation;
use patchwork_domain::error::PatchworkError;
use patchwork_domain::id::ModuleId;
use patchwork_domain::time::now;

use crate::error::StorageError;

/// `SQLite`-backed preference and automation store.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open the database at `database_url` and bring its schema up to date.
    ///
    /// The file is created when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is malformed, the connection fails
    /// or a migration cannot be applied.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl SettingsStore for SqliteSettingsStore {
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, PatchworkError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let value = row
            .map(|(value,)| serde_json::from_str::<bool>(&value))
            .transpose()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<(), PatchworkError> {
        let value = serde_json::to_string(&value).map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(&value)
        .bind(now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn automations(&self, module: &ModuleId) -> Result<Vec<Automation>, PatchworkError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT automations FROM module_automations WHERE module_id = ?")
                .bind(module.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        let Some((json,)) = row else {
            return Ok(Vec::new());
        };
        let automations = serde_json::from_str(&json).map_err(StorageError::from)?;
        Ok(automations)
    }

    async fn set_automations(
        &self,
        module: &ModuleId,
        automations: &[Automation],
    ) -> Result<(), PatchworkError> {
        let json = serde_json::to_string(automations).map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO module_automations (module_id, automations, updated_at) VALUES (?, ?, ?) ON CONFLICT(module_id) DO UPDATE SET automations = excluded.automations, updated_at = excluded.updated_at",
        )
        .bind(module.as_str())
        .bind(&json)
        .bind(now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }
}
