//! Debounced flush timer
//!
//! Coalesces bursts of pokes into a single delayed callback. Every poke moves
//! the deadline to `now + interval`; the callback runs once the pokes have
//! stopped for a full interval.
//!
//! The timer is an explicit two-state machine driven by one dedicated
//! thread. On wake-up the thread re-checks the deadline and either fires or
//! goes back to sleep until the (possibly moved) deadline.

use super::error::{LoggerError, Result};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default quiescence interval before buffered output is flushed
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No fire pending
    Idle,
    /// A fire is pending at `deadline`
    Armed { deadline: Instant },
}

struct Inner {
    state: TimerState,
    closed: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    wakeup: Condvar,
    fires: AtomicU64,
}

pub struct Debouncer {
    interval: Duration,
    shared: Arc<Shared>,
    timer: Option<thread::JoinHandle<()>>,
}

impl Debouncer {
    /// Start the timer thread. `on_fire` runs on that thread.
    pub fn new<F>(interval: Duration, on_fire: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: TimerState::Idle,
                closed: false,
            }),
            wakeup: Condvar::new(),
            fires: AtomicU64::new(0),
        });

        let thread_shared = Arc::clone(&shared);
        let timer = thread::Builder::new()
            .name("log-debounce".into())
            .spawn(move || Self::run(&thread_shared, on_fire))
            .map_err(|e| LoggerError::io_operation("starting debounce timer", "spawn failed", e))?;

        Ok(Self {
            interval,
            shared,
            timer: Some(timer),
        })
    }

    fn run<F: Fn()>(shared: &Shared, on_fire: F) {
        let mut inner = shared.inner.lock();
        loop {
            if inner.closed {
                return;
            }
            match inner.state {
                TimerState::Idle => {
                    shared.wakeup.wait(&mut inner);
                }
                TimerState::Armed { deadline } => {
                    if Instant::now() >= deadline {
                        inner.state = TimerState::Idle;
                        shared.fires.fetch_add(1, Ordering::Relaxed);
                        // pokes must not wait on the callback
                        MutexGuard::unlocked(&mut inner, || on_fire());
                    } else {
                        shared.wakeup.wait_until(&mut inner, deadline);
                    }
                }
            }
        }
    }

    /// Arm the timer, or push an armed deadline back to `now + interval`.
    pub fn poke(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state = TimerState::Armed {
            deadline: Instant::now() + self.interval,
        };
        self.shared.wakeup.notify_one();
    }

    pub fn state(&self) -> TimerState {
        self.shared.inner.lock().state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state(), TimerState::Armed { .. })
    }

    /// How many times the callback has run
    pub fn fire_count(&self) -> u64 {
        self.shared.fires.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        // A pending fire is abandoned, the owner does its own final flush
        self.shared.inner.lock().closed = true;
        self.shared.wakeup.notify_one();
        if let Some(timer) = self.timer.take() {
            if let Err(e) = timer.join() {
                eprintln!("[LOGGER ERROR] Debounce timer thread panicked: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting(interval: Duration) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let debouncer = Debouncer::new(interval, move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (debouncer, count)
    }

    #[test]
    fn test_starts_idle() {
        let (debouncer, count) = counting(Duration::from_millis(20));
        thread::sleep(Duration::from_millis(60));
        assert_eq!(debouncer.state(), TimerState::Idle);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_poke_fires_once() {
        let (debouncer, count) = counting(Duration::from_millis(30));
        debouncer.poke();
        assert!(debouncer.is_armed());

        thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.fire_count(), 1);
        assert_eq!(debouncer.state(), TimerState::Idle);
    }

    #[test]
    fn test_burst_of_pokes_coalesces() {
        let interval = Duration::from_millis(250);
        let fired = Arc::new(Mutex::new(Vec::new()));
        let fired_clone = Arc::clone(&fired);
        let debouncer = Debouncer::new(interval, move || {
            fired_clone.lock().push(Instant::now());
        })
        .unwrap();

        let mut last_poke = Instant::now();
        for _ in 0..1000 {
            last_poke = Instant::now();
            debouncer.poke();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(fired.lock().is_empty(), "fired during the burst");

        thread::sleep(interval + Duration::from_millis(500));
        let fired = fired.lock();
        assert_eq!(fired.len(), 1);
        assert!(fired[0] >= last_poke + interval);
        assert!(fired[0] < last_poke + interval + Duration::from_secs(1));
        assert_eq!(debouncer.fire_count(), 1);
    }

    #[test]
    fn test_separate_quiet_periods_fire_separately() {
        let (debouncer, count) = counting(Duration::from_millis(20));
        debouncer.poke();
        thread::sleep(Duration::from_millis(150));
        debouncer.poke();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_abandons_pending_fire() {
        let (debouncer, count) = counting(Duration::from_millis(100));
        debouncer.poke();
        drop(debouncer);
        thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
