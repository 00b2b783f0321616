//! Stateful command translators for the appliance.
//!
//! Each translator owns the tracked state of one device and decides, from that state and
//! a requested command, which [`IrMessage`](crate::catalog::IrMessage)s have to be sent.
//! Translators never touch hardware; the returned messages are handed to a
//! [`Transmitter`](crate::transmit::Transmitter), usually through the worker queue.
//!
//! State is in memory only and starts at `OFF`.

use core::fmt;
use core::str::FromStr;

use alloc::string::String;

use crate::error::Error;

mod fan;
mod light;

pub use fan::*;
pub use light::*;

/// A device of the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// The ceiling light.
    Light,
    /// The ceiling fan.
    Fan,
}

impl Device {
    /// Identifier used by the command interface.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Device::Light => "light",
            Device::Fan => "fan",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("light") {
            Ok(Device::Light)
        } else if s.eq_ignore_ascii_case("fan") {
            Ok(Device::Fan)
        } else {
            Err(Error::NoSuchTarget(String::from(s)))
        }
    }
}

/// Validates a percentage and truncates it to a whole number.
pub(crate) fn percentage(value: f64) -> Result<u8, Error> {
    if !(0.0..=100.0).contains(&value) {
        return Err(Error::ValueOutOfRange);
    }
    Ok(value as u8)
}
