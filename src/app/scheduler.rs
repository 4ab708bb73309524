use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

/// Bounds how many adb subprocesses run at once and serializes sends that
/// target the same serial. A user mashing NEXT queues key events instead of
/// stacking adb processes.
pub struct SendScheduler {
    semaphore: Arc<Semaphore>,
    serial_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SendScheduler {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            serial_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn permit(&self) -> Permit {
        self.semaphore.acquire()
    }

    /// Lock guarding one device. Sends without an explicit serial share the
    /// `""` lock, since they all land on adb's default device.
    pub fn serial_lock(&self, serial: &str) -> Arc<Mutex<()>> {
        let mut guard = self.serial_locks.lock().expect("serial locks poisoned");
        guard
            .entry(serial.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

struct Semaphore {
    limit: usize,
    used: Mutex<usize>,
    cv: Condvar,
}

impl Semaphore {
    fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            used: Mutex::new(0),
            cv: Condvar::new(),
        }
    }

    fn acquire(self: &Arc<Self>) -> Permit {
        let mut used = self.used.lock().expect("semaphore lock poisoned");
        while *used >= self.limit {
            used = self.cv.wait(used).expect("semaphore lock poisoned");
        }
        *used += 1;
        Permit {
            semaphore: Arc::clone(self),
        }
    }

    fn release(&self) {
        let mut used = self.used.lock().expect("semaphore lock poisoned");
        *used = used.saturating_sub(1);
        self.cv.notify_one();
    }
}

pub struct Permit {
    semaphore: Arc<Semaphore>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
