//! Constants used across the IR remote implementation.
//!
//! This module defines the protocol timings of the Globo remote, the carrier defaults,
//! the waveform buffer limits of the output hardware and the magic numbers the device
//! translators rely on.
//!
//! ## Key Concepts
//!
//! - **Symbol timings**: every IR symbol is a carrier-on *mark* followed by a carrier-off
//!   *space*, both expressed in microseconds.
//! - **Carrier**: the mark phase is modulated with a 38 kHz square wave.
//! - **Buffer limits**: the waveform engine accepts at most [`MAX_PULSES_PER_WAVE`] pulses
//!   per waveform; a safety margin is kept free so a whole symbol always fits.
//!
//! These values must be reproduced exactly for the receiver in the appliance to accept
//! the generated codes.

/// GPIO pin the IR LED driver is wired to (BCM numbering).
pub const DEFAULT_GPIO_PIN: u8 = 18;

/// Carrier frequency of the Globo remote in Hz.
pub const CARRIER_FREQUENCY_HZ: u32 = 38_000;

/// Fraction of one carrier period during which the LED is on.
pub const CARRIER_DUTY_CYCLE: f64 = 0.5;

/// Largest waveform the output hardware accepts, in pulses.
pub const MAX_PULSES_PER_WAVE: usize = 12_000;

/// Pulses kept free at the end of every waveform chunk.
///
/// A chunk is sealed once it can no longer take another symbol, so this only has to
/// exceed the largest single-symbol burst.
pub const CHUNK_SAFETY_MARGIN: usize = 1_000;

/// Upper bound on the pulses a single symbol may expand to.
///
/// At 38 kHz the longest mark (1200 µs) is 46 carrier cycles, i.e. 93 pulses
/// including the trailing space.
pub const MAX_SYMBOL_PULSES: usize = 256;

/// Mark duration (µs) of a short symbol (`0` and `*`).
pub const SHORT_MARK_US: u32 = 400;

/// Mark duration (µs) of a long symbol (`1` and `#`).
pub const LONG_MARK_US: u32 = 1_200;

/// Space duration (µs) following a `0`.
pub const ZERO_SPACE_US: u32 = 1_200;

/// Space duration (µs) following a `1`.
pub const ONE_SPACE_US: u32 = 400;

/// Space duration (µs) following a `*` frame terminator.
pub const STAR_SPACE_US: u32 = 8_000;

/// Space duration (µs) following a `#` frame terminator.
pub const HASH_SPACE_US: u32 = 7_000;

/// Number of times an action frame is repeated inside one catalog code.
pub const FRAME_REPEATS: usize = 4;

/// Number of times the disco code is sent back to back.
pub const DISCO_REPEATS: usize = 10;

/// Minimum number of dimming frames sent for any brightness.
pub const DIMM_BASE_REPEATS: usize = 6;

/// Brightness reported for a light that is fully on.
pub const FULL_BRIGHTNESS: u8 = 100;

/// Depth of the transmission job queue.
pub const JOB_QUEUE_DEPTH: usize = 16;
