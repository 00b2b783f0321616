//! Pulse output devices.
//!
//! The [`PulseOutput`] trait is the boundary to the waveform hardware. A device owns a
//! single waveform slot: a chunk is uploaded, played in repeat mode, stopped and released
//! before the next one can be uploaded. Implementations exist for:
//!
//! - DMA waveform engines, implemented by the application against its GPIO library
//! - [`SoftPulseOutput`], which bit-bangs an `embedded-hal` output pin
//!
//! The scheduler in [`crate::transmit`] is the only caller and never has more than one
//! chunk resident at a time.

use core::fmt::Debug;

use crate::pulse::Pulse;

mod soft;
pub use soft::*;

/// Handle of an uploaded waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaveId(pub u32);

/// Electrical mode of the output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinMode {
    /// Push-pull output.
    #[default]
    Output,
    /// Input; cannot drive an IR LED.
    Input,
}

/// How an uploaded waveform is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveMode {
    /// Play once.
    OneShot,
    /// Loop until [`PulseOutput::stop`] is called, restarting on cycle boundaries.
    #[default]
    RepeatUntilStopped,
}

/// A device that plays pulse sequences on a GPIO pin.
pub trait PulseOutput {
    /// Device specific error.
    type Error: Debug;

    /// Claims `pin` and configures it.
    fn initialize(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error>;

    /// Uploads `pulses` into the waveform slot.
    fn upload(&mut self, pulses: &[Pulse]) -> Result<WaveId, Self::Error>;

    /// Starts playback of an uploaded waveform.
    fn play(&mut self, wave: WaveId, mode: WaveMode) -> Result<(), Self::Error>;

    /// Stops playback.
    fn stop(&mut self, wave: WaveId) -> Result<(), Self::Error>;

    /// Deletes the waveform and frees its buffers.
    fn release(&mut self, wave: WaveId) -> Result<(), Self::Error>;

    /// Releases the device.
    fn terminate(&mut self) -> Result<(), Self::Error>;
}

impl<T: PulseOutput + ?Sized> PulseOutput for &mut T {
    type Error = T::Error;

    fn initialize(&mut self, pin: u8, mode: PinMode) -> Result<(), Self::Error> {
        T::initialize(self, pin, mode)
    }

    fn upload(&mut self, pulses: &[Pulse]) -> Result<WaveId, Self::Error> {
        T::upload(self, pulses)
    }

    fn play(&mut self, wave: WaveId, mode: WaveMode) -> Result<(), Self::Error> {
        T::play(self, wave, mode)
    }

    fn stop(&mut self, wave: WaveId) -> Result<(), Self::Error> {
        T::stop(self, wave)
    }

    fn release(&mut self, wave: WaveId) -> Result<(), Self::Error> {
        T::release(self, wave)
    }

    fn terminate(&mut self) -> Result<(), Self::Error> {
        T::terminate(self)
    }
}
