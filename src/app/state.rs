use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::app::models::SendRecord;
use crate::app::scheduler::SendScheduler;

/// At most this many adb subprocesses in flight across all devices.
const MAX_CONCURRENT_SENDS: usize = 4;

/// Diagnostics keeps this many recent sends; older entries are dropped.
pub const SEND_HISTORY_LIMIT: usize = 50;

pub struct AppState {
    pub scheduler: Arc<SendScheduler>,
    pub recent_sends: Mutex<VecDeque<SendRecord>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            scheduler: Arc::new(SendScheduler::new(MAX_CONCURRENT_SENDS)),
            recent_sends: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record_send(&self, record: SendRecord) {
        if let Ok(mut guard) = self.recent_sends.lock() {
            if guard.len() >= SEND_HISTORY_LIMIT {
                guard.pop_front();
            }
            guard.push_back(record);
        }
    }

    pub fn send_history(&self) -> Vec<SendRecord> {
        self.recent_sends
            .lock()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::keys::MediaKey;

    fn record(trace: &str) -> SendRecord {
        SendRecord {
            key: MediaKey::PlayPause,
            serial: None,
            success: true,
            duration_ms: 12,
            timestamp_utc: "2025-01-01T00:00:00Z".to_string(),
            trace_id: trace.to_string(),
        }
    }

    #[test]
    fn history_evicts_oldest_beyond_limit() {
        let state = AppState::new();
        for index in 0..SEND_HISTORY_LIMIT + 5 {
            state.record_send(record(&format!("trace-{index}")));
        }
        let history = state.send_history();
        assert_eq!(history.len(), SEND_HISTORY_LIMIT);
        assert_eq!(history[0].trace_id, "trace-5");
        assert_eq!(
            history.last().map(|item| item.trace_id.as_str()),
            Some(format!("trace-{}", SEND_HISTORY_LIMIT + 4).as_str())
        );
    }
}
