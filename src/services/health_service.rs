use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Check the storage backend and report the service status.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage_reachable = match state.game_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("storage unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::new(state.is_degraded(), storage_reachable)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{auth::RejectAll, dao::game_store::memory::InMemoryGameStore, state::AppState};

    #[tokio::test]
    async fn reports_ok_with_a_store() {
        let state = AppState::with_game_store(Arc::new(InMemoryGameStore::new()), Arc::new(RejectAll));
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert!(health.storage_reachable);
    }

    #[tokio::test]
    async fn reports_degraded_without_a_store() {
        let state = AppState::new(Arc::new(RejectAll));
        let health = health_status(&state).await;
        assert_eq!(health.status, "degraded");
        assert!(!health.storage_reachable);
    }
}
