//! Runtime configuration of the remote.
//!
//! [`RemoteConfig::default()`] reproduces the wiring and timing of the reference
//! installation: GPIO 18, a 38 kHz carrier with 50 % duty cycle and waveform chunks of
//! 11 000 pulses.

use crate::consts::{CHUNK_SAFETY_MARGIN, DEFAULT_GPIO_PIN, MAX_PULSES_PER_WAVE};
use crate::error::Error;
use crate::pulse::Carrier;

/// What the scheduler does when a chunk fails on the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the remaining chunks of the job and report the failure.
    #[default]
    FailFast,
    /// Log the failure, count it, and keep playing the remaining chunks.
    BestEffort,
}

/// Settings of the encoder, chunker and scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteConfig {
    /// GPIO driving the IR LED.
    pub pin: u8,
    /// Carrier modulated onto marks.
    pub carrier: Carrier,
    /// Largest waveform the output device accepts.
    pub max_pulses_per_wave: usize,
    /// Pulses left free at the end of every chunk.
    pub safety_margin: usize,
    /// How many chunk durations the scheduler waits before stopping a repeating chunk.
    ///
    /// `1` plays each chunk once; larger values let the device loop the chunk.
    pub hold_repeats: u32,
    /// Handling of per-chunk hardware failures.
    pub failure_policy: FailurePolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_GPIO_PIN,
            carrier: Carrier::default(),
            max_pulses_per_wave: MAX_PULSES_PER_WAVE,
            safety_margin: CHUNK_SAFETY_MARGIN,
            hold_repeats: 1,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl RemoteConfig {
    /// Pulses a single chunk may hold.
    pub fn chunk_capacity(&self) -> usize {
        self.max_pulses_per_wave.saturating_sub(self.safety_margin)
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        if self.pin > 31 {
            return Err(Error::InvalidConfig("GPIO pin must be within 0..=31"));
        }
        if self.chunk_capacity() == 0 {
            return Err(Error::InvalidConfig(
                "safety margin leaves no room in a waveform",
            ));
        }
        if self.hold_repeats == 0 {
            return Err(Error::InvalidConfig("hold_repeats must be at least 1"));
        }
        Ok(())
    }
}
