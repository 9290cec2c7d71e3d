use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

fn next_delay(delay: Duration) -> Duration {
    (delay * 2).min(MAX_DELAY)
}

/// Connect to the storage backend, then keep polling it, flipping the shared state in and
/// out of degraded mode as connectivity comes and goes. Never returns.
pub async fn run<F, Fut>(state: SharedState, backend: &'static str, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_game_store(store.clone()).await;
                info!(backend, "storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch_store(&state, backend, store.as_ref()).await;
                warn!(backend, "exhausted storage reconnect attempts; staying in degraded mode");
            }
            Err(err) => {
                warn!(backend, error = %err, "storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = next_delay(delay);
    }
}

/// Poll the installed store until it fails and cannot be revived in place.
async fn watch_store(state: &SharedState, backend: &'static str, store: &dyn GameStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!(backend, "storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => {
                warn!(backend, error = %err, "storage health check failed");
                if !reconnect(state, backend, store).await {
                    return;
                }
                state.update_degraded(false);
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(state: &SharedState, backend: &'static str, store: &dyn GameStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(backend, attempt, "storage reconnection succeeded");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(backend, attempt, error = %err, "storage reconnect failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(backend, attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::RejectAll, dao::game_store::memory::InMemoryGameStore, state::AppState};

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        assert_eq!(next_delay(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(next_delay(Duration::from_secs(8)), MAX_DELAY);
        assert_eq!(next_delay(MAX_DELAY), MAX_DELAY);
    }

    #[tokio::test]
    async fn successful_connection_leaves_degraded_mode() {
        let state = AppState::new(Arc::new(RejectAll));
        let mut watcher = state.degraded_watcher();

        let task = tokio::spawn(run(state.clone(), "memory", || async {
            Ok(Arc::new(InMemoryGameStore::new()) as Arc<dyn GameStore>)
        }));

        tokio::time::timeout(Duration::from_secs(2), watcher.wait_for(|degraded| !degraded))
            .await
            .expect("supervisor did not install the store")
            .unwrap();
        assert!(state.game_store().await.is_some());

        task.abort();
    }
}
