use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Process-wide registry of running campaign dispatchers
///
/// Maps each running campaign to its cancellation flag. The flag is
/// checked by the dispatch loop at chunk boundaries only; an in-flight
/// chunk always completes before cancellation is observed.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AtomicBool>>>>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a campaign as running, returning its cancellation flag
    pub fn register(&self, campaign_id: Uuid) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.inner
            .lock()
            .expect("registry mutex poisoned")
            .insert(campaign_id, Arc::clone(&flag));
        flag
    }

    /// Raise the cancellation flag; returns false when not running
    pub fn cancel(&self, campaign_id: Uuid) -> bool {
        match self
            .inner
            .lock()
            .expect("registry mutex poisoned")
            .get(&campaign_id)
        {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Remove a campaign once its dispatch loop has ended
    pub fn finish(&self, campaign_id: Uuid) {
        self.inner
            .lock()
            .expect("registry mutex poisoned")
            .remove(&campaign_id);
    }

    pub fn is_running(&self, campaign_id: Uuid) -> bool {
        self.inner
            .lock()
            .expect("registry mutex poisoned")
            .contains_key(&campaign_id)
    }

    pub fn running_count(&self) -> usize {
        self.inner.lock().expect("registry mutex poisoned").len()
    }
}
