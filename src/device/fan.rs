//! Fan speed tracking and the frames that select each speed.

use core::fmt;

use super::{Device, percentage};
use crate::catalog::{IrCode, IrMessage};
use crate::error::Error;

/// Speed of the fan, which is also its tracked state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanSpeed {
    /// Stopped.
    #[default]
    Off,
    /// Low speed.
    Low,
    /// Medium speed.
    Med,
    /// High speed.
    High,
}

impl FanSpeed {
    /// Band a percentage: 0 is off, up to 33 low, up to 66 medium, above that high.
    pub const fn from_percentage(value: u8) -> Self {
        match value {
            0 => FanSpeed::Off,
            1..=33 => FanSpeed::Low,
            34..=66 => FanSpeed::Med,
            _ => FanSpeed::High,
        }
    }

    /// Power level reported for the speed.
    pub const fn power_level(&self) -> u8 {
        match self {
            FanSpeed::Off => 0,
            FanSpeed::Low => 33,
            FanSpeed::Med => 66,
            FanSpeed::High => 100,
        }
    }

    /// The code selecting this speed.
    pub const fn code(&self) -> IrCode {
        match self {
            FanSpeed::Off => IrCode::FanOff,
            FanSpeed::Low => IrCode::FanLow,
            FanSpeed::Med => IrCode::FanMed,
            FanSpeed::High => IrCode::FanHigh,
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            FanSpeed::Off => "OFF",
            FanSpeed::Low => "LOW",
            FanSpeed::Med => "MED",
            FanSpeed::High => "HIGH",
        };
        f.write_str(status)
    }
}

/// Commands understood by the fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanCommand {
    /// Switch on; the fan starts at low speed.
    On,
    /// Low speed.
    Low,
    /// Medium speed.
    Med,
    /// High speed.
    High,
    /// Stop.
    Off,
    /// Speed band selected by a percentage (0..=100).
    Percent(u8),
}

impl FanCommand {
    /// Parses an action string (`ON`, `LOW`, `MED`, `HIGH`, `OFF`, `PERCENT`).
    ///
    /// # Errors
    /// - [`Error::UnsupportedOperation`] for unknown actions
    /// - [`Error::MissingValue`] if `PERCENT` has no value
    /// - [`Error::ValueOutOfRange`] if the value is outside `0..=100`
    pub fn parse(action: &str, value: Option<f64>) -> Result<Self, Error> {
        let command = match action.to_ascii_uppercase().as_str() {
            "ON" => FanCommand::On,
            "LOW" => FanCommand::Low,
            "MED" => FanCommand::Med,
            "HIGH" => FanCommand::High,
            "OFF" => FanCommand::Off,
            "PERCENT" => {
                let value = value.ok_or(Error::MissingValue {
                    device: Device::Fan,
                    action: "PERCENT",
                })?;
                FanCommand::Percent(percentage(value)?)
            }
            _ => {
                return Err(Error::UnsupportedOperation {
                    device: Device::Fan,
                    action: action.into(),
                });
            }
        };
        Ok(command)
    }

    /// The speed the command asks for.
    pub const fn target(&self) -> FanSpeed {
        match self {
            FanCommand::On | FanCommand::Low => FanSpeed::Low,
            FanCommand::Med => FanSpeed::Med,
            FanCommand::High => FanSpeed::High,
            FanCommand::Off => FanSpeed::Off,
            FanCommand::Percent(value) => FanSpeed::from_percentage(*value),
        }
    }
}

/// Translator for the ceiling fan.
///
/// Every speed has its own code, so a change is always a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fan {
    speed: FanSpeed,
}

impl Fan {
    /// A stopped fan.
    pub const fn new() -> Self {
        Self {
            speed: FanSpeed::Off,
        }
    }

    /// The tracked speed.
    pub fn speed(&self) -> FanSpeed {
        self.speed
    }

    /// Applies `command`, returning the message to send or `None` if the fan already
    /// runs at the requested speed.
    pub fn apply(&mut self, command: FanCommand) -> Option<IrMessage> {
        let target = command.target();
        if target == self.speed {
            debug!("Fan already at {}", target);
            return None;
        }
        self.speed = target;
        Some(IrMessage::once(target.code()))
    }
}
