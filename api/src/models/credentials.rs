use async_trait::async_trait;
use scrobblist::{
    error::{Result, SyncError},
    CredentialStore, CredentialUpdate, UserCredentials,
};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CredentialRow {
    catalog_refresh_token: Option<String>,
    catalog_access_token: Option<String>,
    history_handle: Option<String>,
}

impl From<CredentialRow> for UserCredentials {
    fn from(row: CredentialRow) -> Self {
        UserCredentials {
            catalog_refresh_token: row.catalog_refresh_token,
            catalog_access_token: row.catalog_access_token,
            history_handle: row.history_handle,
        }
    }
}

fn store_error(e: sqlx::Error) -> SyncError {
    SyncError::Store(e.to_string())
}

/// Credential rows keyed by the caller's user id.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT catalog_refresh_token, catalog_access_token, history_handle FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Into::into))
    }

    async fn put(&self, user_id: &str, update: CredentialUpdate) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, catalog_refresh_token, catalog_access_token, history_handle)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                catalog_refresh_token = COALESCE(excluded.catalog_refresh_token, users.catalog_refresh_token),
                catalog_access_token = COALESCE(excluded.catalog_access_token, users.catalog_access_token),
                history_handle = COALESCE(excluded.history_handle, users.history_handle),
                updated_at = strftime('%s', 'now')",
        )
        .bind(user_id)
        .bind(update.catalog_refresh_token)
        .bind(update.catalog_access_token)
        .bind(update.history_handle)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::TempDir;

    async fn create_test_store() -> (SqliteCredentialStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let url = format!("sqlite:{}", tmp.path().join("users.db").display());
        let pool = db::connect(&url).await.unwrap();
        (SqliteCredentialStore::new(pool), tmp)
    }

    #[tokio::test]
    async fn unknown_user_is_absent() {
        let (store, _tmp) = create_test_store().await;
        assert_eq!(store.get("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_inserts_then_merges() {
        let (store, _tmp) = create_test_store().await;

        store
            .put(
                "42",
                CredentialUpdate {
                    history_handle: Some("rj".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .put(
                "42",
                CredentialUpdate {
                    catalog_refresh_token: Some("refresh-1".to_string()),
                    catalog_access_token: Some("access-1".to_string()),
                    history_handle: None,
                },
            )
            .await
            .unwrap();

        let row = store.get("42").await.unwrap().unwrap();
        assert_eq!(row.history_handle.as_deref(), Some("rj"));
        assert_eq!(row.catalog_refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(row.catalog_access_token.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn put_overwrites_only_given_fields() {
        let (store, _tmp) = create_test_store().await;
        store
            .put(
                "42",
                CredentialUpdate {
                    catalog_refresh_token: Some("refresh-1".to_string()),
                    catalog_access_token: Some("access-1".to_string()),
                    history_handle: Some("rj".to_string()),
                },
            )
            .await
            .unwrap();

        store
            .put(
                "42",
                CredentialUpdate {
                    catalog_access_token: Some("access-2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let row = store.get("42").await.unwrap().unwrap();
        assert_eq!(row.catalog_refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(row.catalog_access_token.as_deref(), Some("access-2"));
        assert_eq!(row.history_handle.as_deref(), Some("rj"));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let (store, _tmp) = create_test_store().await;
        store
            .put(
                "1",
                CredentialUpdate {
                    history_handle: Some("alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .put(
                "2",
                CredentialUpdate {
                    history_handle: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            store.get("1").await.unwrap().unwrap().history_handle.as_deref(),
            Some("alice")
        );
        assert_eq!(
            store.get("2").await.unwrap().unwrap().history_handle.as_deref(),
            Some("bob")
        );
    }
}
