//! Protocol catalog of the Globo light and fan remote.
//!
//! Every multi-frame code is the shared [`PREAMBLE`] followed by four copies of an
//! action frame. The only exception is the dimming step, a single short frame that the
//! light translator repeats a variable number of times to encode a brightness.
//!
//! The strings are reproduced bit for bit from the stock remote and must not be changed.

use alloc::string::String;
use core::fmt;

use crate::consts::DIMM_BASE_REPEATS;

macro_rules! preamble {
    () => {
        "11000000000*11000111111#"
    };
}

macro_rules! framed {
    ($frame:literal) => {
        concat!(preamble!(), $frame, $frame, $frame, $frame)
    };
}

macro_rules! light_power {
    () => {
        framed!("11000000100*")
    };
}

/// Leading symbol sequence shared by all multi-frame codes.
pub const PREAMBLE: &str = preamble!();

/// Toggles the light.
pub const LIGHT_POWER: &str = light_power!();

/// One dimming step; repeated after a single [`PREAMBLE`].
pub const LIGHT_DIMM_STEP: &str = "11000010000*";

/// Stops the fan.
pub const FAN_OFF: &str = framed!("11000001000*");

/// Fan at low speed.
pub const FAN_LOW: &str = framed!("11000100001#");

/// Fan at medium speed.
pub const FAN_MED: &str = framed!("11000000010*");

/// Fan at high speed.
pub const FAN_HIGH: &str = framed!("11000000000#");

/// Power toggle followed by a dangling preamble; sent in bursts it makes the light flash.
pub const DISCO: &str = concat!(light_power!(), preamble!());

/// A physical action of the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrCode {
    /// Light power toggle.
    LightPower,
    /// One dimming step.
    LightDimmStep,
    /// Fan off.
    FanOff,
    /// Fan low speed.
    FanLow,
    /// Fan medium speed.
    FanMed,
    /// Fan high speed.
    FanHigh,
    /// Light flash effect.
    Disco,
}

impl IrCode {
    /// The symbol string of the code.
    pub const fn symbols(&self) -> &'static str {
        match self {
            IrCode::LightPower => LIGHT_POWER,
            IrCode::LightDimmStep => LIGHT_DIMM_STEP,
            IrCode::FanOff => FAN_OFF,
            IrCode::FanLow => FAN_LOW,
            IrCode::FanMed => FAN_MED,
            IrCode::FanHigh => FAN_HIGH,
            IrCode::Disco => DISCO,
        }
    }
}

impl fmt::Display for IrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrCode::LightPower => "LIGHT_POWER",
            IrCode::LightDimmStep => "LIGHT_DIMM_STEP",
            IrCode::FanOff => "FAN_OFF",
            IrCode::FanLow => "FAN_LOW",
            IrCode::FanMed => "FAN_MED",
            IrCode::FanHigh => "FAN_HIGH",
            IrCode::Disco => "DISCO",
        };
        f.write_str(name)
    }
}

/// One code to transmit, repeated back to back as a single transmission plan.
///
/// A dimming message is the [`PREAMBLE`] followed by `repeats` dimming steps; every other
/// message is its code repeated `repeats` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrMessage {
    code: IrCode,
    repeats: usize,
}

impl IrMessage {
    /// The code sent once.
    pub const fn once(code: IrCode) -> Self {
        Self { code, repeats: 1 }
    }

    /// The code sent `repeats` times.
    pub const fn repeated(code: IrCode, repeats: usize) -> Self {
        Self { code, repeats }
    }

    /// The dimming message for a brightness in `1..=99`.
    ///
    /// The receiver counts dimming steps down from full brightness, so darker settings
    /// need more steps: `((100 - value) / 10) + 6`.
    pub const fn dimm(value: u8) -> Self {
        Self::repeated(IrCode::LightDimmStep, dimm_repeats(value))
    }

    /// The code of the message.
    pub const fn code(&self) -> IrCode {
        self.code
    }

    /// How many times the code (or dimming step) is repeated.
    pub const fn repeats(&self) -> usize {
        self.repeats
    }

    /// The full symbol string to transmit.
    pub fn symbols(&self) -> String {
        match self.code {
            IrCode::LightDimmStep => {
                let mut symbols = String::from(PREAMBLE);
                symbols.push_str(&LIGHT_DIMM_STEP.repeat(self.repeats));
                symbols
            }
            code => code.symbols().repeat(self.repeats),
        }
    }
}

impl fmt::Display for IrMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.code, self.repeats)
    }
}

/// Number of dimming steps encoding `value` percent brightness.
pub const fn dimm_repeats(value: u8) -> usize {
    (100usize.saturating_sub(value as usize) / 10) + DIMM_BASE_REPEATS
}
