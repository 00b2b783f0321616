//! Transmission scheduling.
//!
//! The [`Transmitter`] owns the output device and plays [`TransmissionPlan`]s through it.
//! For every chunk, strictly in order:
//!
//! 1. upload the chunk's pulses into the device's waveform slot
//! 2. start playback in [`WaveMode::RepeatUntilStopped`]
//! 3. block for the chunk's duration (times [`RemoteConfig::hold_repeats`])
//! 4. stop playback and release the waveform
//!
//! Only then is the next chunk uploaded, so at most one waveform is resident on the device
//! at any time. Holding `&mut self` for the whole plan is what guarantees this; callers
//! that share a transmitter between threads go through [`crate::worker`].
//!
//! Hardware failures are handled according to the configured [`FailurePolicy`].

use embedded_hal::delay::DelayNs;

use crate::catalog::IrMessage;
use crate::config::{FailurePolicy, RemoteConfig};
use crate::error::{Error, HardwareFault, TxStage};
use crate::output::{PinMode, PulseOutput, WaveMode};
use crate::pulse::PulseEncoder;
use crate::wave::{TransmissionPlan, WaveChunk};

/// Summary of a finished transmission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxReport {
    /// Messages sent.
    pub messages: usize,
    /// Chunks played successfully.
    pub chunks_sent: usize,
    /// Chunks that failed on the hardware (best-effort policy only).
    pub chunks_failed: usize,
    /// Pulses played successfully.
    pub pulses: usize,
    /// Airtime of the successfully played chunks, in microseconds.
    pub airtime_us: u64,
}

impl TxReport {
    fn merge(&mut self, other: TxReport) {
        self.messages += other.messages;
        self.chunks_sent += other.chunks_sent;
        self.chunks_failed += other.chunks_failed;
        self.pulses += other.pulses;
        self.airtime_us += other.airtime_us;
    }
}

/// Plays IR messages on a [`PulseOutput`], pacing chunks with a blocking delay.
#[derive(Debug)]
pub struct Transmitter<O, D> {
    output: O,
    delay: D,
    encoder: PulseEncoder,
    chunk_capacity: usize,
    hold_repeats: u32,
    policy: FailurePolicy,
}

impl<O, D> Transmitter<O, D>
where
    O: PulseOutput,
    D: DelayNs,
{
    /// Validates `config` and initializes the output device.
    ///
    /// # Errors
    /// - configuration errors from [`RemoteConfig::validate`] and [`PulseEncoder::new`]
    /// - [`Error::HardwareUnavailable`] if the device refuses to initialize
    pub fn new(mut output: O, delay: D, config: &RemoteConfig) -> Result<Self, Error> {
        config.validate()?;
        let encoder = PulseEncoder::new(config.pin, config.carrier)?;
        output
            .initialize(config.pin, PinMode::Output)
            .map_err(|e| {
                error!("Failed to initialize output on GPIO {}: {:?}", config.pin, e);
                Error::HardwareUnavailable(HardwareFault::device(TxStage::Initialize))
            })?;
        info!(
            "Output ready on GPIO {} ({} Hz carrier, {} pulses per chunk)",
            config.pin,
            config.carrier.frequency_hz(),
            config.chunk_capacity()
        );
        Ok(Self {
            output,
            delay,
            encoder,
            chunk_capacity: config.chunk_capacity(),
            hold_repeats: config.hold_repeats,
            policy: config.failure_policy,
        })
    }

    /// The pulse encoder in use.
    pub fn encoder(&self) -> &PulseEncoder {
        &self.encoder
    }

    /// The output device.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Gives back the output device and the delay.
    pub fn into_parts(self) -> (O, D) {
        (self.output, self.delay)
    }

    /// Encodes and chunks a message without sending it.
    pub fn plan(&self, message: &IrMessage) -> Result<TransmissionPlan, Error> {
        let symbols = message.symbols();
        let bursts = self.encoder.encode(&symbols)?;
        let plan = TransmissionPlan::build(bursts.iter().map(|b| &b[..]), self.chunk_capacity)?;
        debug!(
            "Generated {} chunks with {} pulses for {}",
            plan.len(),
            plan.pulse_count(),
            message
        );
        Ok(plan)
    }

    /// Sends one message.
    pub fn send(&mut self, message: &IrMessage) -> Result<TxReport, Error> {
        let plan = self.plan(message)?;
        let mut report = self.send_plan(&plan)?;
        report.messages = 1;
        Ok(report)
    }

    /// Sends messages in order, each as its own plan.
    ///
    /// With [`FailurePolicy::FailFast`] the first failure aborts the remaining messages.
    pub fn send_all(&mut self, messages: &[IrMessage]) -> Result<TxReport, Error> {
        let mut report = TxReport::default();
        for message in messages {
            report.merge(self.send(message)?);
        }
        Ok(report)
    }

    /// Plays every chunk of `plan` in order.
    pub fn send_plan(&mut self, plan: &TransmissionPlan) -> Result<TxReport, Error> {
        let mut report = TxReport::default();
        for (index, chunk) in plan.chunks().iter().enumerate() {
            match self.send_chunk(index, chunk) {
                Ok(()) => {
                    report.chunks_sent += 1;
                    report.pulses += chunk.len();
                    report.airtime_us += chunk.duration_us();
                }
                Err(fault) => match self.policy {
                    FailurePolicy::FailFast => {
                        return Err(Error::HardwareUnavailable(fault));
                    }
                    FailurePolicy::BestEffort => {
                        warn!("Skipping chunk {}: {}", index, fault);
                        report.chunks_failed += 1;
                    }
                },
            }
        }
        Ok(report)
    }

    fn send_chunk(&mut self, index: usize, chunk: &WaveChunk) -> Result<(), HardwareFault> {
        let wave = self.output.upload(chunk.pulses()).map_err(|e| {
            error!("Error creating wave for chunk {}: {:?}", index, e);
            HardwareFault::chunk(TxStage::Upload, index)
        })?;

        if let Err(e) = self.output.play(wave, WaveMode::RepeatUntilStopped) {
            error!("Error sending chunk {}: {:?}", index, e);
            if let Err(e) = self.output.release(wave) {
                error!("Error deleting wave of chunk {}: {:?}", index, e);
            }
            return Err(HardwareFault::chunk(TxStage::Play, index));
        }

        let hold_us = chunk.duration_us() * u64::from(self.hold_repeats);
        trace!("Chunk {} playing, waiting {} us", index, hold_us);
        self.hold(hold_us);

        let stopped = self.output.stop(wave);
        let released = self.output.release(wave);
        if let Err(e) = stopped {
            error!("Error stopping chunk {}: {:?}", index, e);
            return Err(HardwareFault::chunk(TxStage::Stop, index));
        }
        if let Err(e) = released {
            error!("Error deleting wave of chunk {}: {:?}", index, e);
            return Err(HardwareFault::chunk(TxStage::Release, index));
        }
        Ok(())
    }

    fn hold(&mut self, mut us: u64) {
        while us > 0 {
            let step = us.min(u64::from(u32::MAX));
            self.delay.delay_us(step as u32);
            us -= step;
        }
    }

    /// Shuts the output device down.
    pub fn terminate(&mut self) -> Result<(), Error> {
        info!("Terminating output");
        self.output.terminate().map_err(|e| {
            error!("Failed to terminate output: {:?}", e);
            Error::HardwareUnavailable(HardwareFault::device(TxStage::Terminate))
        })
    }
}
