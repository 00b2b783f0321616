//! Shared test infrastructure for globo-ir integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::sync::{Arc, Condvar, Mutex};

use globo_ir::output::{PinMode, PulseOutput, WaveId, WaveMode};
use globo_ir::pulse::{Carrier, Pulse, PulseEncoder};
use globo_ir::{Controller, RemoteConfig};
use embedded_hal_mock::eh1::delay::NoopDelay;

// ============================================================================
// Recording output device
// ============================================================================

/// Everything the output device has seen.
#[derive(Debug, Default)]
pub struct Recording {
    pub initialized: Option<u8>,
    pub uploads: Vec<Vec<Pulse>>,
    pub plays: usize,
    pub resident: usize,
    pub max_resident: usize,
    pub terminated: bool,
}

/// Blocks playback while closed.
#[derive(Debug, Default)]
pub struct Gate {
    closed: Mutex<bool>,
    changed: Condvar,
}

impl Gate {
    pub fn close(&self) {
        *self.closed.lock().unwrap() = true;
    }

    pub fn open(&self) {
        *self.closed.lock().unwrap() = false;
        self.changed.notify_all();
    }

    fn pass(&self) {
        let mut closed = self.closed.lock().unwrap();
        while *closed {
            closed = self.changed.wait(closed).unwrap();
        }
    }
}

/// Output device that records uploads and counts resident waveforms.
///
/// Clones share the same recording, so a test keeps one clone while the controller's
/// worker thread owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    pub recording: Arc<Mutex<Recording>>,
    pub gate: Arc<Gate>,
    pub fail_uploads: bool,
    pub panic_on_upload: bool,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic_on_upload: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<Vec<Pulse>> {
        self.recording.lock().unwrap().uploads.clone()
    }

    /// All uploaded pulses, concatenated in upload order.
    pub fn transmitted(&self) -> Vec<Pulse> {
        self.uploads().into_iter().flatten().collect()
    }

    pub fn max_resident(&self) -> usize {
        self.recording.lock().unwrap().max_resident
    }

    pub fn terminated(&self) -> bool {
        self.recording.lock().unwrap().terminated
    }
}

impl PulseOutput for RecordingOutput {
    type Error = &'static str;

    fn initialize(&mut self, pin: u8, _mode: PinMode) -> Result<(), Self::Error> {
        self.recording.lock().unwrap().initialized = Some(pin);
        Ok(())
    }

    fn upload(&mut self, pulses: &[Pulse]) -> Result<WaveId, Self::Error> {
        if self.panic_on_upload {
            panic!("wave buffer corrupted");
        }
        if self.fail_uploads {
            return Err("wave create failed");
        }
        let mut recording = self.recording.lock().unwrap();
        recording.uploads.push(pulses.to_vec());
        recording.resident += 1;
        recording.max_resident = recording.max_resident.max(recording.resident);
        Ok(WaveId(recording.uploads.len() as u32))
    }

    fn play(&mut self, _wave: WaveId, _mode: WaveMode) -> Result<(), Self::Error> {
        self.gate.pass();
        self.recording.lock().unwrap().plays += 1;
        Ok(())
    }

    fn stop(&mut self, _wave: WaveId) -> Result<(), Self::Error> {
        Ok(())
    }

    fn release(&mut self, _wave: WaveId) -> Result<(), Self::Error> {
        self.recording.lock().unwrap().resident -= 1;
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), Self::Error> {
        self.recording.lock().unwrap().terminated = true;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Controller on a recording output with the default configuration.
pub fn controller() -> (Controller, RecordingOutput) {
    controller_with(RemoteConfig::default())
}

pub fn controller_with(config: RemoteConfig) -> (Controller, RecordingOutput) {
    let output = RecordingOutput::new();
    let controller = Controller::new(output.clone(), NoopDelay::new(), &config).unwrap();
    (controller, output)
}

/// Pulses of `code` on the default pin and carrier.
pub fn expected_pulses(code: &str) -> Vec<Pulse> {
    PulseEncoder::new(18, Carrier::default())
        .unwrap()
        .encode_pulses(code)
        .unwrap()
}
