//! Error types shared by every stage of the remote.
//!
//! Validation errors ([`Error::UnsupportedOperation`], [`Error::ValueOutOfRange`],
//! [`Error::MissingValue`], [`Error::NoSuchTarget`]) are raised before any hardware is
//! touched. [`Error::HardwareUnavailable`] is raised by the output device, either while
//! initializing or while a chunk is being played.

use alloc::string::String;
use core::fmt;

use crate::device::Device;

/// The step of the hardware interaction that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    /// Claiming the output pin.
    Initialize,
    /// Uploading a chunk into the waveform slot.
    Upload,
    /// Starting playback of an uploaded chunk.
    Play,
    /// Stopping a repeating chunk.
    Stop,
    /// Freeing the waveform slot.
    Release,
    /// Shutting the output device down.
    Terminate,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            TxStage::Initialize => "initialize",
            TxStage::Upload => "upload",
            TxStage::Play => "play",
            TxStage::Stop => "stop",
            TxStage::Release => "release",
            TxStage::Terminate => "terminate",
        };
        f.write_str(stage)
    }
}

/// Where a hardware failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareFault {
    /// The failing step.
    pub stage: TxStage,
    /// Index of the chunk inside its transmission plan, if the failure is chunk related.
    pub chunk: Option<usize>,
}

impl HardwareFault {
    /// A failure that is not tied to any chunk.
    pub const fn device(stage: TxStage) -> Self {
        Self { stage, chunk: None }
    }

    /// A failure while handling chunk `chunk`.
    pub const fn chunk(stage: TxStage, chunk: usize) -> Self {
        Self {
            stage,
            chunk: Some(chunk),
        }
    }
}

impl fmt::Display for HardwareFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk {
            Some(chunk) => write!(f, "{} failed on chunk {}", self.stage, chunk),
            None => write!(f, "{} failed", self.stage),
        }
    }
}

/// Errors returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The device does not understand the requested action.
    #[error("unsupported operation `{action}` for {device}")]
    UnsupportedOperation {
        /// Target device.
        device: Device,
        /// The rejected action string.
        action: String,
    },
    /// A percentage outside `0..=100` was supplied.
    #[error("value out of range, expected a percentage within 0..=100")]
    ValueOutOfRange,
    /// The action requires a value and none was given.
    #[error("action `{action}` for {device} requires a value")]
    MissingValue {
        /// Target device.
        device: Device,
        /// The action that needed a value.
        action: &'static str,
    },
    /// The device identifier is unknown.
    #[error("no such target `{0}`")]
    NoSuchTarget(String),
    /// The output device failed.
    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(HardwareFault),
    /// An IR code contains a character outside the symbol alphabet.
    #[error("unknown symbol `{0}` in IR code")]
    UnknownSymbol(char),
    /// A single symbol expands to more pulses than a burst can hold.
    #[error("symbol expands to {pulses} pulses, burst capacity is {capacity}")]
    SymbolTooLong {
        /// Pulses the symbol needs.
        pulses: usize,
        /// Burst capacity.
        capacity: usize,
    },
    /// A burst does not fit into an empty waveform chunk.
    #[error("{pulses} pulses do not fit into a chunk of {capacity}")]
    ChunkOverflow {
        /// Pulses that were appended.
        pulses: usize,
        /// Chunk capacity.
        capacity: usize,
    },
    /// Carrier frequency or duty cycle cannot produce a usable square wave.
    #[error("invalid carrier frequency or duty cycle")]
    InvalidCarrier,
    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The transmission queue has no room for another job.
    #[error("transmission queue is full")]
    QueueFull,
    /// The transmission worker is no longer running.
    #[error("transmission worker has stopped")]
    WorkerStopped,
}

impl Error {
    /// Whether the error was raised by input validation, before any hardware access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedOperation { .. }
                | Error::ValueOutOfRange
                | Error::MissingValue { .. }
                | Error::NoSuchTarget(_)
        )
    }
}
