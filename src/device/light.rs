//! Light state machine.
//!
//! Tracks power and brightness and turns each [`LightCommand`] into the remote presses
//! that reach the requested state from the current one.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::{Device, percentage};
use crate::catalog::{IrCode, IrMessage};
use crate::consts::{DISCO_REPEATS, FULL_BRIGHTNESS};
use crate::error::Error;

/// Tracked state of the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightState {
    /// Light is off.
    #[default]
    Off,
    /// Light is on at full brightness.
    On,
    /// Light is on at the given brightness (1..=99).
    Dimmed(u8),
}

impl LightState {
    /// Brightness in percent: 0 when off, 100 when fully on.
    pub const fn brightness(&self) -> u8 {
        match self {
            LightState::Off => 0,
            LightState::On => FULL_BRIGHTNESS,
            LightState::Dimmed(value) => *value,
        }
    }
}

/// Formats as `STATUS:brightness`, e.g. `ON:100`, `DIMMED:42`, `OFF:0`.
impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            LightState::Off => "OFF",
            LightState::On => "ON",
            LightState::Dimmed(_) => "DIMMED",
        };
        write!(f, "{}:{}", status, self.brightness())
    }
}

/// Commands understood by the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    /// Press the power button regardless of the tracked state.
    Power,
    /// Switch on at full brightness.
    On,
    /// Switch off.
    Off,
    /// Set the brightness in percent. 0 switches off, 100 switches fully on.
    Dimm(u8),
    /// Flash the light without changing the tracked state.
    Disco,
}

impl LightCommand {
    /// Parses an action string (`POWER`, `ON`, `OFF`, `DIMM`, `DISCO`).
    ///
    /// `DIMM` needs a value within `0..=100`; fractional values are truncated. Values
    /// given to other actions are ignored.
    ///
    /// # Errors
    /// - [`Error::UnsupportedOperation`] for unknown actions
    /// - [`Error::MissingValue`] if `DIMM` has no value
    /// - [`Error::ValueOutOfRange`] if the value is outside `0..=100`
    pub fn parse(action: &str, value: Option<f64>) -> Result<Self, Error> {
        let command = match action.to_ascii_uppercase().as_str() {
            "POWER" => LightCommand::Power,
            "ON" => LightCommand::On,
            "OFF" => LightCommand::Off,
            "DISCO" => LightCommand::Disco,
            "DIMM" => {
                let value = value.ok_or(Error::MissingValue {
                    device: Device::Light,
                    action: "DIMM",
                })?;
                LightCommand::Dimm(percentage(value)?)
            }
            _ => {
                return Err(Error::UnsupportedOperation {
                    device: Device::Light,
                    action: action.into(),
                });
            }
        };
        Ok(command)
    }
}

/// Translator for the ceiling light.
///
/// The light has a single power toggle and a dimming step that lowers brightness from
/// full; there is no way to brighten. Setting a brightness therefore first brings the
/// light to full brightness:
///
/// | Tracked state | Power presses before dimming |
/// |---------------|------------------------------|
/// | `Off`         | 1                            |
/// | `On`          | 0                            |
/// | `Dimmed`      | 2 (off, then on at full)     |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Light {
    state: LightState,
}

impl Light {
    /// A light in the `Off` state.
    pub const fn new() -> Self {
        Self {
            state: LightState::Off,
        }
    }

    /// The tracked state.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// Applies `command` and returns the messages to send, in order.
    ///
    /// An empty list means the light is already in the requested state.
    pub fn apply(&mut self, command: LightCommand) -> Vec<IrMessage> {
        let power = IrMessage::once(IrCode::LightPower);
        match command {
            LightCommand::Power => {
                self.state = match self.state {
                    LightState::Off => LightState::On,
                    LightState::On | LightState::Dimmed(_) => LightState::Off,
                };
                vec![power]
            }
            LightCommand::On => {
                if self.state == LightState::On {
                    debug!("Light is already ON");
                    return Vec::new();
                }
                self.state = LightState::On;
                vec![power]
            }
            LightCommand::Off => {
                if self.state == LightState::Off {
                    debug!("Light is already OFF");
                    return Vec::new();
                }
                self.state = LightState::Off;
                vec![power]
            }
            LightCommand::Dimm(0) => self.apply(LightCommand::Off),
            LightCommand::Dimm(value) if value >= FULL_BRIGHTNESS => {
                self.apply(LightCommand::On)
            }
            LightCommand::Dimm(value) => {
                let mut messages = match self.state {
                    LightState::Off => vec![power],
                    LightState::On => Vec::new(),
                    LightState::Dimmed(_) => vec![power, power],
                };
                messages.push(IrMessage::dimm(value));
                self.state = LightState::Dimmed(value);
                messages
            }
            LightCommand::Disco => vec![IrMessage::repeated(IrCode::Disco, DISCO_REPEATS)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn light_in(state: LightState) -> Light {
        Light { state }
    }

    fn power_presses(messages: &[IrMessage]) -> usize {
        messages
            .iter()
            .filter(|m| m.code() == IrCode::LightPower)
            .count()
    }

    #[test]
    fn test_starts_off() {
        assert_eq!(Light::new().state(), LightState::Off);
        assert_eq!(Light::default(), Light::new());
    }

    #[test]
    fn test_on_and_off() {
        let mut light = Light::new();
        assert_eq!(light.apply(LightCommand::On), [IrMessage::once(IrCode::LightPower)]);
        assert_eq!(light.state(), LightState::On);
        assert!(light.apply(LightCommand::On).is_empty());

        assert_eq!(light.apply(LightCommand::Off), [IrMessage::once(IrCode::LightPower)]);
        assert_eq!(light.state(), LightState::Off);
        assert!(light.apply(LightCommand::Off).is_empty());
    }

    #[test]
    fn test_power_toggles() {
        let mut light = Light::new();
        assert_eq!(power_presses(&light.apply(LightCommand::Power)), 1);
        assert_eq!(light.state(), LightState::On);
        assert_eq!(power_presses(&light.apply(LightCommand::Power)), 1);
        assert_eq!(light.state(), LightState::Off);

        let mut light = light_in(LightState::Dimmed(40));
        assert_eq!(power_presses(&light.apply(LightCommand::Power)), 1);
        assert_eq!(light.state(), LightState::Off);
    }

    #[test]
    fn test_dimm_from_off() {
        let mut light = Light::new();
        let messages = light.apply(LightCommand::Dimm(50));
        assert_eq!(
            messages,
            [IrMessage::once(IrCode::LightPower), IrMessage::dimm(50)]
        );
        assert_eq!(messages[1].repeats(), 11);
        assert_eq!(light.state(), LightState::Dimmed(50));
    }

    #[test]
    fn test_dimm_from_on() {
        let mut light = light_in(LightState::On);
        assert_eq!(light.apply(LightCommand::Dimm(90)), [IrMessage::dimm(90)]);
        assert_eq!(light.state(), LightState::Dimmed(90));
    }

    #[test]
    fn test_dimm_from_dimmed_power_cycles() {
        let mut light = light_in(LightState::Dimmed(40));
        let messages = light.apply(LightCommand::Dimm(60));
        assert_eq!(power_presses(&messages), 2);
        assert_eq!(messages.last(), Some(&IrMessage::dimm(60)));
        assert_eq!(light.state(), LightState::Dimmed(60));
    }

    #[test]
    fn test_dimm_boundaries() {
        let mut from_on = light_in(LightState::On);
        let mut reference = light_in(LightState::On);
        assert_eq!(
            from_on.apply(LightCommand::Dimm(0)),
            reference.apply(LightCommand::Off)
        );
        assert_eq!(from_on.state(), reference.state());
        assert_eq!(from_on.state(), LightState::Off);

        let mut light = light_in(LightState::Dimmed(30));
        assert_eq!(
            light.apply(LightCommand::Dimm(100)),
            [IrMessage::once(IrCode::LightPower)]
        );
        assert_eq!(light.state(), LightState::On);

        let mut light = Light::new();
        assert!(light.apply(LightCommand::Dimm(0)).is_empty());
    }

    #[test]
    fn test_disco_keeps_state() {
        let mut light = light_in(LightState::Dimmed(20));
        assert_eq!(
            light.apply(LightCommand::Disco),
            [IrMessage::repeated(IrCode::Disco, 10)]
        );
        assert_eq!(light.state(), LightState::Dimmed(20));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(LightState::Off.to_string(), "OFF:0");
        assert_eq!(LightState::On.to_string(), "ON:100");
        assert_eq!(LightState::Dimmed(42).to_string(), "DIMMED:42");
    }

    #[test]
    fn test_parse() {
        assert_eq!(LightCommand::parse("ON", None), Ok(LightCommand::On));
        assert_eq!(LightCommand::parse("power", Some(3.0)), Ok(LightCommand::Power));
        assert_eq!(
            LightCommand::parse("DIMM", Some(42.7)),
            Ok(LightCommand::Dimm(42))
        );
        assert_eq!(
            LightCommand::parse("DIMM", Some(101.0)),
            Err(Error::ValueOutOfRange)
        );
        assert_eq!(
            LightCommand::parse("DIMM", None),
            Err(Error::MissingValue {
                device: Device::Light,
                action: "DIMM"
            })
        );
        assert!(matches!(
            LightCommand::parse("BLINK", None),
            Err(Error::UnsupportedOperation { device: Device::Light, .. })
        ));
    }
}
