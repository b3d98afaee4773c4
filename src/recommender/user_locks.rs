//! Per-user critical sections.
//!
//! Feedback for one user must be applied in submission order, but unrelated
//! users must never serialize against each other, so the engine locks a
//! mutex keyed by user id instead of anything global.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(super) struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock for one user, created on first use.
    pub fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
