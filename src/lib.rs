//! # globo-ir
//!
//! Infrared remote engine for the Globo ceiling light and fan, driving a bare IR LED from a
//! single GPIO pin.
//!
//! The crate turns high level commands (`light DIMM 40`, `fan HIGH`) into carrier
//! modulated pulse trains and plays them on an output device:
//! - `encoding` and `catalog` hold the four-symbol IR alphabet and the device's codes
//! - `pulse` synthesizes the 38 kHz carrier bursts for every symbol
//! - `wave` packs bursts into chunks the output device can hold
//! - `transmit` uploads and plays chunks one at a time through a [`PulseOutput`]
//! - `device` tracks the light and fan state and picks the messages to send
//! - `controller` and `worker` acknowledge commands at once and transmit in the background
//!
//! ## Crate features
//! | Feature           | Description |
//! |-------------------|-------------|
//! | `std` (default)   | Disables `#![no_std]`, enables the background [`worker`] and the [`controller`] |
//! | `log` (default)   | Uses `log` logging |
//!
//! Without `std` the encoder, planner, transmitter and device translators are still
//! available and only need `alloc`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use globo_ir::{Controller, RemoteConfig, SoftPulseOutput};
//!
//! fn run<P, D>(pin: P, carrier_delay: D, hold_delay: D) -> Result<(), globo_ir::Error>
//! where
//!     P: OutputPin + Send + 'static,
//!     D: DelayNs + Send + 'static,
//! {
//!     let output = SoftPulseOutput::new(pin, carrier_delay);
//!     let controller = Controller::new(output, hold_delay, &RemoteConfig::default())?;
//!
//!     let ack = controller.apply_command("fan", "HIGH", None)?;
//!     assert_eq!(ack.status, "HIGH");
//!     let _report = ack.wait()?;
//!
//!     controller.shutdown()
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Timing precision of the carrier is up to the [`PulseOutput`]; a DMA backed wave
//!   generator is recommended over [`SoftPulseOutput`]
//! - Only one waveform is ever resident on the output device
//! - Device state is tracked in memory only; the appliance gives no feedback

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod fmt;

pub use critical_section;
pub use heapless;

pub mod catalog;
pub mod config;
pub mod consts;
pub mod device;
pub mod encoding;
pub mod error;
pub mod output;
pub mod pulse;
pub mod transmit;
pub mod wave;

#[cfg(feature = "std")]
pub mod controller;
#[cfg(feature = "std")]
pub mod worker;

pub use catalog::{IrCode, IrMessage};
pub use config::{FailurePolicy, RemoteConfig};
pub use device::{Device, Fan, FanCommand, FanSpeed, Light, LightCommand, LightState};
pub use encoding::Symbol;
pub use error::{Error, HardwareFault, TxStage};
pub use output::{PulseOutput, SoftPulseOutput};
pub use pulse::{Carrier, Pulse, PulseEncoder};
pub use transmit::{Transmitter, TxReport};
pub use wave::{TransmissionPlan, WaveChunk};

#[cfg(feature = "std")]
pub use controller::{Ack, Command, Controller, Outcome};
#[cfg(feature = "std")]
pub use worker::{Job, Receipt, Worker};
