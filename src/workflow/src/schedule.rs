//! Periodic jobs driven by an injectable clock.

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Source of time for scheduled work.
#[async_trait]
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;

    /// Completes once `deadline` has been reached.
    async fn sleep_until(&self, deadline: Instant);
}

/// Wall-clock time through `tokio::time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: watch::Sender<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        let (elapsed, _) = watch::channel(Duration::ZERO);
        Self {
            origin: Instant::now(),
            elapsed,
        }
    }

    /// Moves time forward, waking every sleeper whose deadline passed.
    pub fn advance(&self, by: Duration) {
        self.elapsed.send_modify(|elapsed| *elapsed += by);
    }

    /// Total time advanced so far.
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep_until(&self, deadline: Instant) {
        let mut elapsed = self.elapsed.subscribe();
        while self.origin + *elapsed.borrow_and_update() < deadline {
            if elapsed.changed().await.is_err() {
                return;
            }
        }
    }
}

/// When a periodic task fires.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    /// Stop on its own after this many ticks
    pub max_ticks: Option<u64>,
}

impl Schedule {
    /// Fires every `interval` until stopped.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }
}

/// A job re-run on a fixed interval.
///
/// Ticks are aligned to the start instant. A deadline that passed while the
/// previous job was still running is skipped, not replayed; one reached just
/// as the job finishes still fires.
/// A failing job is logged and the schedule carries on. Dropping the task
/// stops it after the current tick.
pub struct PeriodicTask {
    stop: watch::Sender<bool>,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns the task; the first tick fires one interval from now.
    pub fn start<K, F, Fut, E>(clock: Arc<K>, schedule: Schedule, mut job: F) -> Self
    where
        K: Clock + ?Sized + 'static,
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = ticks.clone();
        let mut next = clock.now() + schedule.interval;

        let handle = tokio::spawn(async move {
            loop {
                if schedule.max_ticks.map_or(false, |max| counter.load(Ordering::SeqCst) >= max) {
                    break;
                }

                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = clock.sleep_until(next) => {}
                }

                let tick = counter.load(Ordering::SeqCst) + 1;
                debug!("Running tick {}", tick);
                if let Err(e) = job(tick).await {
                    warn!("Tick {} failed: {}", tick, e);
                }
                counter.store(tick, Ordering::SeqCst);

                next += schedule.interval;
                let now = clock.now();
                if next < now {
                    next = now + schedule.interval;
                }
            }
        });

        Self {
            stop,
            ticks,
            handle: Some(handle),
        }
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Waits for the task to end on its own (`max_ticks` reached).
    pub async fn wait(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.await {
                warn!("Periodic task ended abnormally: {}", e);
            }
            self.handle = None;
        }
    }

    /// Stops the task after the tick in progress and returns the tick count.
    pub async fn stop(mut self) -> u64 {
        let _ = self.stop.send(true);
        self.wait().await;
        self.ticks()
    }
}
