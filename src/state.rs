use crate::errors::{AppError, StorageError};
use crate::storage::FileBackend;
use crate::store::ActivityStore;
use std::sync::Arc;
use tokio::{sync::Mutex, task};

pub type SharedStore = Arc<Mutex<ActivityStore<FileBackend>>>;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new(store: ActivityStore<FileBackend>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs a store mutation on the blocking pool. The store lock is held
    /// until the backend write has finished.
    pub async fn mutate<T, F>(&self, work: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ActivityStore<FileBackend>) -> Result<T, StorageError> + Send + 'static,
    {
        let mut store = Arc::clone(&self.store).lock_owned().await;
        let outcome = task::spawn_blocking(move || work(&mut *store))
            .await
            .map_err(AppError::internal)?;
        Ok(outcome?)
    }
}
