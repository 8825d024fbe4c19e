//! Timer coordination engine
//!
//! Owns the single countdown slot and the single generator slot and keeps
//! them paired:
//!
//! - locks are always taken timer slot first, generator slot second;
//! - `start` holds the timer slot for the whole replacement;
//! - `stop` and the completion hook hold both slots before changing either,
//!   then release the timer slot and join the generator on a spawned task
//!   that keeps the generator slot until the line is LOW. Dropping the caller
//!   at any await leaves both slots untouched or the teardown still running;
//! - `status` only takes the timer slot, so it waits on teardown only when
//!   queued behind a `start` that is itself waiting for the generator slot;
//! - each countdown carries a generation id, and a completion hook whose id
//!   no longer matches the active slot does nothing.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use futures::FutureExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::{
    admission::DurationRequest,
    countdown::{CountdownTimer, OnComplete},
    generator::SignalGenerator,
};
use crate::{
    error::TimerError,
    output::{Line, PulseOutput},
    state::{ControllerState, TimerStatus},
};

enum TimerSlot {
    Idle,
    Armed { id: u64, timer: CountdownTimer },
    /// The countdown elapsed and its hook tore the generator down; reported
    /// once as idle and then collapsed.
    Finished,
}

/// Coordinates one countdown with one square wave generator
pub struct TimerController {
    output: Arc<dyn PulseOutput>,
    line: Line,
    half_period: Duration,
    timer: Mutex<TimerSlot>,
    generator: Arc<Mutex<Option<SignalGenerator>>>,
    next_id: AtomicU64,
}

impl TimerController {
    /// Create an idle controller driving `line`. The line must already be
    /// configured as an output.
    pub fn new(
        output: Arc<dyn PulseOutput>,
        line: Line,
        half_period: Duration,
    ) -> Result<Self, TimerError> {
        if half_period.is_zero() {
            return Err(TimerError::InvalidDuration(
                "signal half-period must be positive".to_string(),
            ));
        }

        Ok(Self {
            output,
            line,
            half_period,
            timer: Mutex::new(TimerSlot::Idle),
            generator: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    /// Parse the client's time fields and start the countdown
    pub async fn start_request(self: &Arc<Self>, request: &DurationRequest) -> Result<(), TimerError> {
        let duration = request.to_duration()?;
        self.start(duration).await
    }

    /// Start a countdown of `duration` with the signal running alongside.
    pub async fn start(self: &Arc<Self>, duration: Duration) -> Result<(), TimerError> {
        let mut slot = self.timer.lock().await;

        if let TimerSlot::Armed { timer, .. } = &*slot {
            if timer.is_running() {
                return Err(TimerError::AlreadyRunning);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut timer = CountdownTimer::new(duration, self.completion_hook(id))?;

        {
            let mut generator_slot = self.generator.lock().await;
            if let Some(mut stale) = generator_slot.take() {
                warn!("Tearing down stale signal generator on line {}", stale.line());
                stale.stop().await;
            }

            let mut generator =
                SignalGenerator::new(Arc::clone(&self.output), self.line, self.half_period)?;
            generator.start().await?;
            *generator_slot = Some(generator);

            if let Err(e) = timer.start() {
                if let Some(mut generator) = generator_slot.take() {
                    generator.stop().await;
                }
                return Err(e);
            }
        }

        // Replacing an elapsed timer here turns its pending hook stale
        *slot = TimerSlot::Armed { id, timer };
        info!("Timer {} started for {:.3}s", id, duration.as_secs_f64());
        Ok(())
    }

    /// Cancel any running countdown and stop the signal. A no-op when idle.
    pub async fn stop(&self) {
        let mut slot = self.timer.lock().await;
        let generator_slot = Arc::clone(&self.generator).lock_owned().await;

        match std::mem::replace(&mut *slot, TimerSlot::Idle) {
            TimerSlot::Armed { id, timer } => {
                if timer.cancel() {
                    info!("Timer {} cancelled", id);
                } else {
                    debug!("Timer {} had already elapsed when stopped", id);
                }
            }
            TimerSlot::Finished | TimerSlot::Idle => {}
        }

        drop(slot);
        tear_down(generator_slot).await;
    }

    /// Snapshot of whether the countdown is running and how long is left
    pub async fn status(&self) -> TimerStatus {
        let mut slot = self.timer.lock().await;

        if matches!(*slot, TimerSlot::Finished) {
            *slot = TimerSlot::Idle;
            return TimerStatus::idle();
        }

        match &*slot {
            TimerSlot::Armed { id, timer } => match timer.remaining() {
                Some(remaining) => TimerStatus::running(remaining),
                None => {
                    debug!("Timer {} is no longer running, reporting idle", id);
                    TimerStatus::idle()
                }
            },
            TimerSlot::Finished | TimerSlot::Idle => TimerStatus::idle(),
        }
    }

    /// Current position in the Idle / Running / Finished state machine,
    /// without collapsing Finished.
    pub async fn state(&self) -> ControllerState {
        match &*self.timer.lock().await {
            TimerSlot::Armed { timer, .. } if timer.is_running() => ControllerState::Running,
            TimerSlot::Armed { .. } | TimerSlot::Finished => ControllerState::Finished,
            TimerSlot::Idle => ControllerState::Idle,
        }
    }

    fn completion_hook(self: &Arc<Self>, id: u64) -> OnComplete {
        let controller = Arc::downgrade(self);
        Box::new(move || {
            async move {
                if let Some(controller) = controller.upgrade() {
                    controller.on_timer_elapsed(id).await;
                }
            }
            .boxed()
        })
    }

    async fn on_timer_elapsed(&self, id: u64) {
        let mut slot = self.timer.lock().await;

        match &*slot {
            TimerSlot::Armed { id: active, .. } if *active == id => {}
            _ => {
                debug!("Ignoring completion of replaced timer {}", id);
                return;
            }
        }
        let generator_slot = Arc::clone(&self.generator).lock_owned().await;
        *slot = TimerSlot::Finished;
        drop(slot);

        tear_down(generator_slot).await;
        info!("Timer {} finished", id);
    }
}

/// Stop and join the slot's generator on its own task. The slot stays locked
/// until the line is LOW, even if the caller is dropped first.
async fn tear_down(mut generator_slot: OwnedMutexGuard<Option<SignalGenerator>>) {
    let teardown = tokio::spawn(async move {
        if let Some(mut generator) = generator_slot.take() {
            generator.stop().await;
        }
    });

    if let Err(e) = teardown.await {
        warn!("Signal generator teardown failed: {}", e);
    }
}
