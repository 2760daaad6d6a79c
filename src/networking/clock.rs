//! Local clock ticking for subscribed sessions
//!
//! One interval task per game. A task runs only while its session is
//! `STARTED` and the game is subscribed; it ends on its own when the status
//! changes and is aborted on unsubscribe.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::networking::registry::SharedSession;

#[derive(Debug)]
pub struct ClockDriver {
    period: Duration,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ClockDriver {
    pub fn new(period: Duration) -> Self {
        ClockDriver {
            period,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start or stop ticking to match the session's current status
    pub fn sync(&self, game_id: &str, session: &SharedSession) {
        if session.read().status().clock_runs() {
            self.start(game_id, session);
        } else {
            self.stop(game_id);
        }
    }

    /// Restart ticking after an authoritative correction
    ///
    /// The next local tick lands one full period after the correction.
    pub fn reset(&self, game_id: &str, session: &SharedSession) {
        self.stop(game_id);
        if session.read().status().clock_runs() {
            self.start(game_id, session);
        }
    }

    pub fn start(&self, game_id: &str, session: &SharedSession) {
        let mut tasks = self.tasks.lock();
        if tasks.get(game_id).is_some_and(|task| !task.is_finished()) {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            warn!("[CLOCK] No runtime available, {} will not tick", game_id);
            return;
        };

        let session = SharedSession::clone(session);
        let period = self.period;
        let elapsed_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        let id = game_id.to_string();
        debug!("[CLOCK] Starting clock for {}", id);

        let task = handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if !session.write().tick(elapsed_ms) {
                    debug!("[CLOCK] {} left STARTED, stopping", id);
                    break;
                }
            }
        });
        tasks.insert(game_id.to_string(), task);
    }

    pub fn stop(&self, game_id: &str) {
        if let Some(task) = self.tasks.lock().remove(game_id) {
            debug!("[CLOCK] Stopping clock for {}", game_id);
            task.abort();
        }
    }

    pub fn is_running(&self, game_id: &str) -> bool {
        self.tasks
            .lock()
            .get(game_id)
            .is_some_and(|task| !task.is_finished())
    }

    pub fn stop_all(&self) {
        for (_, task) in self.tasks.lock().drain() {
            task.abort();
        }
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.stop_all();
    }
}
