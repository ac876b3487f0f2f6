//! Test doubles shared by unit tests.

use crate::retry::Sleep;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records requested pauses instead of sleeping.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSleep(Arc<Mutex<Vec<Duration>>>);

impl RecordingSleep {
    pub(crate) fn pauses(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleep for RecordingSleep {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}
