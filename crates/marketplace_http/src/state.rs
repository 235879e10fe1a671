//! Shared handler state.

use crate::error::ApiError;
use marketplace_core::{RepoResult, Store};
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct AppState {
    store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Runs one repository call on the blocking pool over a fresh connection.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> RepoResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = store.connect()?;
            op(&mut conn)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("repository task failed: {err}")))?;

        outcome.map_err(ApiError::from)
    }
}
