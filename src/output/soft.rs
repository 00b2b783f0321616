//! Bit-banged output on an `embedded-hal` pin.

use alloc::vec::Vec;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};

use super::{PinMode, PulseOutput, WaveId, WaveMode};
use crate::pulse::Pulse;

/// Errors of [`SoftPulseOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SoftOutputError {
    /// [`PulseOutput::initialize`] has not been called.
    #[error("output is not initialized")]
    NotInitialized,
    /// The pin cannot be driven in the requested mode.
    #[error("pin mode {0:?} cannot drive a pulse output")]
    UnsupportedMode(PinMode),
    /// The GPIO number has no bit in a 32-bit mask.
    #[error("GPIO {0} is out of range")]
    InvalidPin(u8),
    /// A waveform is already resident.
    #[error("waveform slot is occupied")]
    SlotBusy,
    /// The waveform id is not the resident one.
    #[error("unknown waveform {0:?}")]
    UnknownWave(WaveId),
    /// The underlying pin failed.
    #[error("pin error: {0:?}")]
    Pin(ErrorKind),
}

/// A [`PulseOutput`] that bit-bangs an `embedded-hal` output pin.
///
/// Pulses are rendered with blocking delays, so [`play`](PulseOutput::play) returns only
/// after one full pass over the waveform. Repeat mode is rendered as a single pass; the
/// pin rests low until the scheduler stops the waveform.
///
/// Only the bit of the initialized GPIO is honoured in pulse masks.
#[derive(Debug)]
pub struct SoftPulseOutput<P, D> {
    pin: P,
    delay: D,
    mask: u32,
    initialized: bool,
    slot: Option<(WaveId, Vec<Pulse>)>,
    next_id: u32,
}

impl<P, D> SoftPulseOutput<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates the device. The pin is not touched until
    /// [`initialize`](PulseOutput::initialize).
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            pin,
            delay,
            mask: 0,
            initialized: false,
            slot: None,
            next_id: 0,
        }
    }

    /// Gives back the pin and the delay.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }

    /// Whether a waveform is currently uploaded.
    pub fn is_loaded(&self) -> bool {
        self.slot.is_some()
    }

    fn write(&mut self, high: bool) -> Result<(), SoftOutputError> {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| SoftOutputError::Pin(e.kind()))
    }

    fn check(&self, wave: WaveId) -> Result<(), SoftOutputError> {
        if !self.initialized {
            return Err(SoftOutputError::NotInitialized);
        }
        match &self.slot {
            Some((id, _)) if *id == wave => Ok(()),
            _ => Err(SoftOutputError::UnknownWave(wave)),
        }
    }
}

impl<P, D> PulseOutput for SoftPulseOutput<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    type Error = SoftOutputError;

    fn initialize(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error> {
        if mode != PinMode::Output {
            return Err(SoftOutputError::UnsupportedMode(mode));
        }
        if pin > 31 {
            return Err(SoftOutputError::InvalidPin(pin));
        }
        self.write(false)?;
        self.mask = 1 << pin;
        self.initialized = true;
        Ok(())
    }

    fn upload(&mut self, pulses: &[Pulse]) -> Result<WaveId, Self::Error> {
        if !self.initialized {
            return Err(SoftOutputError::NotInitialized);
        }
        if self.slot.is_some() {
            return Err(SoftOutputError::SlotBusy);
        }
        let id = WaveId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.slot = Some((id, pulses.to_vec()));
        Ok(id)
    }

    fn play(&mut self, wave: WaveId, _mode: WaveMode) -> Result<(), Self::Error> {
        self.check(wave)?;
        let pulses = match self.slot.take() {
            Some((_, pulses)) => pulses,
            None => return Err(SoftOutputError::UnknownWave(wave)),
        };
        let mut result = Ok(());
        for pulse in &pulses {
            if pulse.on_mask & self.mask != 0 {
                result = self.write(true);
            } else if pulse.off_mask & self.mask != 0 {
                result = self.write(false);
            }
            if result.is_err() {
                break;
            }
            self.delay.delay_us(pulse.duration_us);
        }
        self.slot = Some((wave, pulses));
        result
    }

    fn stop(&mut self, wave: WaveId) -> Result<(), Self::Error> {
        self.check(wave)?;
        self.write(false)
    }

    fn release(&mut self, wave: WaveId) -> Result<(), Self::Error> {
        self.check(wave)?;
        self.slot = None;
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), Self::Error> {
        self.slot = None;
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        self.write(false)
    }
}
