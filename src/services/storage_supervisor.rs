//! Keeps the room store connected, degrading the API instead of failing it.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{room_store::RoomStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Supervise the room store: connect with backoff, poll its health, and pull
/// it out of the shared state whenever it stops answering, so handlers return
/// a degraded error instead of timing out against a dead backend.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RoomStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                info!("room store connected; leaving degraded mode");
                state.install_room_store(store.clone()).await;
                delay = INITIAL_DELAY;
                watch_store(&state, store).await;
            }
            Err(err) => {
                warn!(error = %err, "room store connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the installed store until it stops answering and cannot be revived
/// in place. The store is uninstalled for the whole outage so no handler
/// touches a dead connection.
async fn watch_store(state: &SharedState, store: Arc<dyn RoomStore>) {
    loop {
        if store.health_check().await.is_ok() {
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        warn!("room store health check failed; entering degraded mode");
        state.clear_room_store().await;

        if revive(store.as_ref()).await {
            info!("room store revived; leaving degraded mode");
            state.install_room_store(store.clone()).await;
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        warn!("room store reconnect attempts exhausted; connecting from scratch");
        return;
    }
}

/// Bounded in-place reconnect attempts with exponential backoff.
async fn revive(store: &dyn RoomStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => return true,
            Err(err) => {
                warn!(attempt, error = %err, "room store reconnect attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
