//! Square wave generator task

use std::{fmt, sync::Arc, time::Duration};
use tokio::{sync::oneshot, task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    output::{Level, Line, PulseOutput},
};

/// Toggles one output line between HIGH and LOW every `half_period` until
/// stopped. The line is left LOW on every exit path.
pub struct SignalGenerator {
    line: Line,
    half_period: Duration,
    output: Arc<dyn PulseOutput>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SignalGenerator {
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
            line,
            half_period,
            output,
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawn the toggling task. Returns once the first HIGH has been written.
    ///
    /// A generator drives exactly one run; starting it again is an error.
    pub async fn start(&mut self) -> Result<(), TimerError> {
        if self.task.is_some() || self.cancel.is_cancelled() {
            return Err(TimerError::InvalidState {
                expected: "unstarted generator",
                actual: "generator already used",
            });
        }

        let (started_tx, started_rx) = oneshot::channel();
        self.task = Some(tokio::spawn(square_wave(
            Arc::clone(&self.output),
            self.line,
            self.half_period,
            self.cancel.clone(),
            started_tx,
        )));

        if started_rx.await.is_err() {
            warn!("Signal generator on line {} exited before its first toggle", self.line);
        }
        info!(
            "Signal generator started on line {} ({:?} half-period)",
            self.line, self.half_period
        );
        Ok(())
    }

    /// Stop toggling and wait for the task to finish. Once this returns the
    /// line is LOW and no further writes will happen.
    pub async fn stop(&mut self) {
        self.cancel.cancel();

        let Some(task) = self.task.take() else {
            return;
        };

        if let Err(e) = task.await {
            warn!("Signal generator on line {} ended abnormally: {}", self.line, e);
            self.output.write(self.line, Level::Low);
        }
        info!("Signal generator stopped on line {}", self.line);
    }
}

impl Drop for SignalGenerator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl fmt::Debug for SignalGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalGenerator")
            .field("line", &self.line)
            .field("half_period", &self.half_period)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn square_wave(
    output: Arc<dyn PulseOutput>,
    line: Line,
    half_period: Duration,
    cancel: CancellationToken,
    started: oneshot::Sender<()>,
) {
    let mut started = Some(started);
    let mut level = Level::High;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        output.write(line, level);
        if let Some(started) = started.take() {
            let _ = started.send(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(half_period) => {}
        }
        level = level.toggled();
    }

    output.write(line, Level::Low);
    debug!("Square wave on line {} parked LOW", line);
}
