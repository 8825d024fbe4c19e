//! Raspberry Pi GPIO backend
//!
//! Only built with the `hardware` feature so hosts without the Pi's GPIO
//! peripheral still build the rest of the crate.

use std::{collections::HashMap, sync::Mutex};
use rppal::gpio::{self, Gpio, InputPin, OutputPin};
use tracing::{debug, info, warn};

use super::{Direction, Level, Line, PulseOutput};
use crate::error::TimerError;

enum Pin {
    Input(InputPin),
    Output(OutputPin),
}

/// Output backend driving BCM-numbered pins through `rppal`.
///
/// The GPIO peripheral is opened on the first `configure`, which fails when
/// not running on a Pi or without access to `/dev/gpiomem`.
#[derive(Default)]
pub struct RpiOutput {
    gpio: Mutex<Option<Gpio>>,
    pins: Mutex<HashMap<Line, Pin>>,
}

impl RpiOutput {
    pub fn new() -> Self {
        Self::default()
    }

    fn gpio(&self, line: Line) -> Result<Gpio, TimerError> {
        let mut gpio = self.gpio.lock().map_err(|_| TimerError::Output {
            line,
            source: "GPIO handle poisoned".into(),
        })?;

        if let Some(gpio) = gpio.as_ref() {
            return Ok(gpio.clone());
        }

        let opened = Gpio::new().map_err(|e| output_error(line, e))?;
        info!("Opened Raspberry Pi GPIO");
        *gpio = Some(opened.clone());
        Ok(opened)
    }
}

fn output_error(line: Line, error: gpio::Error) -> TimerError {
    TimerError::Output {
        line,
        source: Box::new(error),
    }
}

/// BCM pin numbers fit in a byte; anything larger cannot be a Pi pin.
fn bcm_pin(line: Line) -> Result<u8, TimerError> {
    u8::try_from(line).map_err(|_| TimerError::Output {
        line,
        source: format!("line {} is not a BCM pin number", line).into(),
    })
}

fn gpio_level(level: Level) -> gpio::Level {
    match level {
        Level::High => gpio::Level::High,
        Level::Low => gpio::Level::Low,
    }
}

impl PulseOutput for RpiOutput {
    fn configure(&self, line: Line, direction: Direction) -> Result<(), TimerError> {
        let pin = self
            .gpio(line)?
            .get(bcm_pin(line)?)
            .map_err(|e| output_error(line, e))?;

        let pin = match direction {
            Direction::Output => Pin::Output(pin.into_output_low()),
            Direction::Input => Pin::Input(pin.into_input()),
        };

        match self.pins.lock() {
            Ok(mut pins) => {
                pins.insert(line, pin);
            }
            Err(e) => warn!("GPIO pin table poisoned: {}", e),
        }
        debug!("GPIO {} configured as {:?}", line, direction);
        Ok(())
    }

    fn write(&self, line: Line, level: Level) {
        let Ok(mut pins) = self.pins.lock() else {
            warn!("GPIO pin table poisoned, dropping write to line {}", line);
            return;
        };

        match pins.get_mut(&line) {
            Some(Pin::Output(pin)) => pin.write(gpio_level(level)),
            Some(Pin::Input(_)) => warn!("GPIO {} is configured as an input, ignoring {}", line, level),
            None => warn!("GPIO {} was never configured, ignoring {}", line, level),
        }
    }
}
