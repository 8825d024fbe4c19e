//! Configuration and CLI argument handling

use std::{sync::Arc, time::Duration};
use clap::{Parser, ValueEnum};

use crate::{
    error::TimerError,
    output::{Line, PulseOutput, SimulatedOutput},
};

/// Which pulse output driver to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputBackend {
    /// Log writes instead of driving hardware
    Simulated,
    /// Raspberry Pi GPIO (needs the `hardware` feature)
    Gpio,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "pulse-timer")]
#[command(about = "A web controlled countdown timer driving a square wave on a GPIO line")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "5000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Output line to drive (BCM 18 is physical pin 12 on a Pi header)
    #[arg(short, long, default_value = "18")]
    pub line: Line,

    /// Time between square wave level toggles, in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub half_period_ms: u64,

    /// Output driver
    #[arg(short, long, value_enum, default_value = "simulated")]
    pub output: OutputBackend,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn half_period(&self) -> Duration {
        Duration::from_millis(self.half_period_ms)
    }

    /// Build the configured output driver
    pub fn build_output(&self) -> Result<Arc<dyn PulseOutput>, TimerError> {
        match self.output {
            OutputBackend::Simulated => Ok(Arc::new(SimulatedOutput::new())),
            #[cfg(feature = "hardware")]
            OutputBackend::Gpio => Ok(Arc::new(crate::output::RpiOutput::new())),
            #[cfg(not(feature = "hardware"))]
            OutputBackend::Gpio => Err(TimerError::Output {
                line: self.line,
                source: "GPIO output requires building with the `hardware` feature".into(),
            }),
        }
    }
}
