//! The periodic poll loop.

use crate::engine::SyncEngine;
use crate::transport::ChatTransport;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Spawns the background ticker that drives periodic fetches.
///
/// The first tick fires one full interval after the call, not
/// immediately; callers that want an eager initial fetch do it
/// themselves before spawning. Failed ticks are logged and dropped
/// here, since the engine already surfaces them to the store and
/// schedules its own delayed retry.
///
/// Aborting the returned handle stops the loop; an in-flight fetch
/// is cancelled at its next await point.
pub fn spawn_poll_loop<T: ChatTransport + 'static>(engine: SyncEngine<T>) -> JoinHandle<()> {
    let period = engine.config().poll_interval;
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = engine.fetch_new().await {
                debug!(error = %e, "periodic fetch failed");
            }
        }
    })
}
