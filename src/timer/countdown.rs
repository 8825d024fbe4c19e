//! One-shot countdown timer with a cancellable completion hook
//!
//! ```text
//!         start()            deadline reached
//!  Idle ──────────► Running ─────────────────► Completed (hook runs)
//!                      │
//!                      │ cancel()
//!                      ▼
//!                  Cancelled (hook never runs)
//! ```
//!
//! Expiry and `cancel()` both go through a compare-and-transition on the
//! phase under the timer's own lock, so exactly one of them wins.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use futures::future::BoxFuture;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TimerError;

/// Action run on the timer's own task once the countdown elapses
pub type OnComplete = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + Sync>;

/// Externally visible lifecycle of a [`CountdownTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Completed => "completed",
            TimerPhase::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Running { started: Instant },
    Completed,
    Cancelled,
}

impl Phase {
    fn public(self) -> TimerPhase {
        match self {
            Phase::Idle => TimerPhase::Idle,
            Phase::Running { .. } => TimerPhase::Running,
            Phase::Completed => TimerPhase::Completed,
            Phase::Cancelled => TimerPhase::Cancelled,
        }
    }
}

fn lock(phase: &Mutex<Phase>) -> MutexGuard<'_, Phase> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A countdown that fires its hook once after `duration`, unless cancelled
/// first. Each instance runs at most once.
pub struct CountdownTimer {
    duration: Duration,
    phase: Arc<Mutex<Phase>>,
    cancel: CancellationToken,
    on_complete: Option<OnComplete>,
}

impl CountdownTimer {
    /// Create an idle timer. Fails with [`TimerError::InvalidDuration`] for a
    /// zero duration.
    pub fn new(duration: Duration, on_complete: OnComplete) -> Result<Self, TimerError> {
        if duration.is_zero() {
            return Err(TimerError::InvalidDuration(
                "countdown duration must be positive".to_string(),
            ));
        }

        Ok(Self {
            duration,
            phase: Arc::new(Mutex::new(Phase::Idle)),
            cancel: CancellationToken::new(),
            on_complete: Some(on_complete),
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn phase(&self) -> TimerPhase {
        lock(&self.phase).public()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == TimerPhase::Running
    }

    /// Start counting down and schedule the completion hook.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), TimerError> {
        let started = Instant::now();
        let deadline = started.checked_add(self.duration).ok_or_else(|| {
            TimerError::InvalidDuration(format!("{:?} is too far in the future", self.duration))
        })?;

        {
            let mut phase = lock(&self.phase);
            if !matches!(*phase, Phase::Idle) {
                return Err(TimerError::InvalidState {
                    expected: TimerPhase::Idle.as_str(),
                    actual: phase.public().as_str(),
                });
            }
            *phase = Phase::Running { started };
        }

        let phase = Arc::clone(&self.phase);
        let cancel = self.cancel.clone();
        let on_complete = self.on_complete.take();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Countdown cancelled before expiry");
                    return;
                }
                _ = sleep_until(deadline) => {}
            }

            {
                let mut phase = lock(&phase);
                if !matches!(*phase, Phase::Running { .. }) {
                    debug!("Countdown expired after cancellation, hook suppressed");
                    return;
                }
                *phase = Phase::Completed;
            }

            if let Some(on_complete) = on_complete {
                on_complete().await;
            }
        });

        Ok(())
    }

    /// Cancel a running countdown. Returns `false` without effect when the
    /// timer is not running, including when expiry already won the race.
    pub fn cancel(&self) -> bool {
        let mut phase = lock(&self.phase);
        if !matches!(*phase, Phase::Running { .. }) {
            return false;
        }
        *phase = Phase::Cancelled;
        self.cancel.cancel();
        true
    }

    /// Time since start, only while running
    pub fn elapsed(&self) -> Option<Duration> {
        match *lock(&self.phase) {
            Phase::Running { started } => Some(started.elapsed()),
            _ => None,
        }
    }

    /// Seconds left, only while running. Slightly negative between expiry and
    /// the hook taking over.
    pub fn remaining(&self) -> Option<f64> {
        self.elapsed()
            .map(|elapsed| self.duration.as_secs_f64() - elapsed.as_secs_f64())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("duration", &self.duration)
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use tokio::time;

    use super::*;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> OnComplete {
        let counter = Arc::clone(counter);
        Box::new(move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_duration() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(2), counting_hook(&fired)).unwrap();
        timer.start().unwrap();

        time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(timer.is_running());

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.phase(), TimerPhase::Completed);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_completion() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(2), counting_hook(&fired)).unwrap();
        timer.start().unwrap();

        time::sleep(Duration::from_secs(1)).await;
        assert!(timer.cancel());
        assert_eq!(timer.phase(), TimerPhase::Cancelled);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_completion_is_a_noop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(1), counting_hook(&fired)).unwrap();
        timer.start().unwrap();

        time::sleep(Duration::from_secs(2)).await;
        assert!(!timer.cancel());
        assert_eq!(timer.phase(), TimerPhase::Completed);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_on_idle_timer_is_a_noop() {
        let fired = Arc::new(AtomicUsize::new(0));
        let timer = CountdownTimer::new(Duration::from_secs(1), counting_hook(&fired)).unwrap();
        assert!(!timer.cancel());
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_and_remaining_only_while_running() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(10), counting_hook(&fired)).unwrap();
        assert_eq!(timer.elapsed(), None);
        assert_eq!(timer.remaining(), None);

        timer.start().unwrap();
        assert_eq!(timer.elapsed(), Some(Duration::ZERO));
        assert_eq!(timer.remaining(), Some(10.0));

        time::sleep(Duration::from_secs(4)).await;
        let elapsed = timer.elapsed().unwrap();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_millis(4_010));
        let remaining = timer.remaining().unwrap();
        assert!((remaining - 6.0).abs() < 0.01);

        timer.cancel();
        assert_eq!(timer.elapsed(), None);
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_only_valid_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(1), counting_hook(&fired)).unwrap();
        timer.start().unwrap();

        let err = timer.start().unwrap_err();
        assert!(matches!(
            err,
            TimerError::InvalidState {
                expected: "idle",
                actual: "running"
            }
        ));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let fired = Arc::new(AtomicUsize::new(0));
        let err = CountdownTimer::new(Duration::ZERO, counting_hook(&fired)).unwrap_err();
        assert!(matches!(err, TimerError::InvalidDuration(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_running_timer_cancels_it() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut timer = CountdownTimer::new(Duration::from_secs(1), counting_hook(&fired)).unwrap();
        timer.start().unwrap();
        drop(timer);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
