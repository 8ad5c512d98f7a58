use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chaincore_core::ports::TimerService;
use chaincore_types::Hash;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// `tokio::time`-based per-hash timer, the concrete backing for
/// [`TimerService`]. Each `start` spawns a task that sleeps for `timeout`
/// and then, unless cancelled first, sends `key` on the caller-supplied
/// channel.
pub struct TokioTimerService {
    handles: Arc<Mutex<HashMap<Hash, JoinHandle<()>>>>,
}

impl TokioTimerService {
    pub fn new() -> Self {
        Self {
            handles: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for TokioTimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService for TokioTimerService {
    fn start(&self, key: Hash, timeout: Duration, on_expiry: mpsc::UnboundedSender<Hash>) {
        let handles = self.handles.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            handles.lock().remove(&key);
            let _ = on_expiry.send(key);
        });
        if let Some(previous) = self.handles.lock().insert(key, handle) {
            previous.abort();
        }
    }

    fn stop(&self, key: Hash) {
        if let Some(handle) = self.handles.lock().remove(&key) {
            handle.abort();
        }
    }
}
