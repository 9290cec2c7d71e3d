use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{auth::TokenVerifier, dao::game_store::GameStore, error::ServiceError};

pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, the token verifier and the degraded flag.
pub struct AppState {
    game_store: RwLock<Option<Arc<dyn GameStore>>>,
    verifier: Arc<dyn TokenVerifier>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            game_store: RwLock::new(None),
            verifier,
            degraded: degraded_tx,
        })
    }

    /// Construct a state with a store already installed.
    pub fn with_game_store(
        store: Arc<dyn GameStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            game_store: RwLock::new(Some(store)),
            verifier,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current game store, if one is installed.
    pub async fn game_store(&self) -> Option<Arc<dyn GameStore>> {
        let guard = self.game_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the game store, failing while the application is degraded.
    pub async fn require_game_store(&self) -> Result<Arc<dyn GameStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.game_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new game store implementation and leave degraded mode.
    pub async fn set_game_store(&self, store: Arc<dyn GameStore>) {
        {
            let mut guard = self.game_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, notifying watchers only when it changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Verifier used by the authentication gate.
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.verifier.as_ref()
    }
}
