//! Command dispatch for the whole appliance.
//!
//! The [`Controller`] is the entry point for outer surfaces (HTTP handlers, voice skills,
//! CLIs). It parses commands, runs them through the device translators, queues the
//! resulting messages on the [`Worker`] and acknowledges with the new status right away.
//!
//! Each device's state sits behind its own lock, held from translation until the job is
//! queued. Jobs for the same device are therefore queued in the order their states were
//! committed, and a command rejected by validation or a full queue leaves the state
//! untouched.

use std::string::{String, ToString};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::catalog::IrMessage;
use crate::config::RemoteConfig;
use crate::device::{Device, Fan, FanCommand, FanSpeed, Light, LightCommand, LightState};
use crate::error::Error;
use crate::output::PulseOutput;
use crate::transmit::{Transmitter, TxReport};
use crate::worker::{Job, Receipt, Worker};

/// A parsed command for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A light command.
    Light(LightCommand),
    /// A fan command.
    Fan(FanCommand),
}

impl Command {
    /// Parses a `(device, action, value)` triple.
    ///
    /// # Errors
    /// [`Error::NoSuchTarget`] for unknown devices, otherwise the errors of
    /// [`LightCommand::parse`] and [`FanCommand::parse`].
    pub fn parse(device: &str, action: &str, value: Option<f64>) -> Result<Self, Error> {
        match device.parse::<Device>()? {
            Device::Light => LightCommand::parse(action, value).map(Command::Light),
            Device::Fan => FanCommand::parse(action, value).map(Command::Fan),
        }
    }

    /// The device the command is for.
    pub const fn device(&self) -> Device {
        match self {
            Command::Light(_) => Device::Light,
            Command::Fan(_) => Device::Fan,
        }
    }
}

/// What happened to an accepted command.
#[derive(Debug)]
pub enum Outcome {
    /// Messages were queued for transmission.
    Submitted(Receipt),
    /// The device was already in the requested state; nothing was sent.
    AlreadySatisfied,
}

/// Acknowledgement of an accepted command.
#[derive(Debug)]
pub struct Ack {
    /// The addressed device.
    pub device: Device,
    /// Status of the device after the command, e.g. `DIMMED:40` or `HIGH`.
    pub status: String,
    /// Whether anything was queued.
    pub outcome: Outcome,
}

impl Ack {
    /// Whether the command needed no transmission.
    pub fn is_already_satisfied(&self) -> bool {
        matches!(self.outcome, Outcome::AlreadySatisfied)
    }

    /// Blocks until the queued messages have been transmitted.
    ///
    /// Returns an empty report if nothing was queued.
    pub fn wait(self) -> Result<TxReport, Error> {
        match self.outcome {
            Outcome::Submitted(receipt) => receipt.wait(),
            Outcome::AlreadySatisfied => Ok(TxReport::default()),
        }
    }
}

/// Tracks the light and the fan and sends their commands in the background.
#[derive(Debug)]
pub struct Controller {
    light: Mutex<Light>,
    fan: Mutex<Fan>,
    worker: Worker,
}

impl Controller {
    /// Initializes `output` and starts the transmission worker.
    ///
    /// Both devices start `OFF`.
    pub fn new<O, D>(output: O, delay: D, config: &RemoteConfig) -> Result<Self, Error>
    where
        O: PulseOutput + Send + 'static,
        D: DelayNs + Send + 'static,
    {
        let transmitter = Transmitter::new(output, delay, config)?;
        Self::with_transmitter(transmitter)
    }

    /// Starts the transmission worker on an existing transmitter.
    pub fn with_transmitter<O, D>(transmitter: Transmitter<O, D>) -> Result<Self, Error>
    where
        O: PulseOutput + Send + 'static,
        D: DelayNs + Send + 'static,
    {
        Ok(Self {
            light: Mutex::new(Light::new()),
            fan: Mutex::new(Fan::new()),
            worker: Worker::spawn(transmitter)?,
        })
    }

    /// Parses and applies a `(device, action, value)` triple.
    ///
    /// ```no_run
    /// # fn demo(controller: &globo_ir::Controller) -> Result<(), globo_ir::Error> {
    /// let ack = controller.apply_command("light", "DIMM", Some(40.0))?;
    /// assert_eq!(ack.status, "DIMMED:40");
    /// # Ok(())
    /// # }
    /// ```
    pub fn apply_command(
        &self,
        device: &str,
        action: &str,
        value: Option<f64>,
    ) -> Result<Ack, Error> {
        let command = Command::parse(device, action, value)?;
        self.apply(command)
    }

    /// Applies a parsed command.
    ///
    /// # Errors
    /// [`Error::QueueFull`] or [`Error::WorkerStopped`] if the messages could not be
    /// queued; the device state is left unchanged in that case.
    pub fn apply(&self, command: Command) -> Result<Ack, Error> {
        info!("Applying {:?}", command);
        match command {
            Command::Light(command) => {
                let mut light = lock(&self.light);
                let mut next = light.clone();
                let messages = next.apply(command);
                let outcome = self.submit(messages)?;
                *light = next;
                Ok(Ack {
                    device: Device::Light,
                    status: light.state().to_string(),
                    outcome,
                })
            }
            Command::Fan(command) => {
                let mut fan = lock(&self.fan);
                let mut next = fan.clone();
                let messages = next.apply(command).into_iter().collect();
                let outcome = self.submit(messages)?;
                *fan = next;
                Ok(Ack {
                    device: Device::Fan,
                    status: fan.speed().to_string(),
                    outcome,
                })
            }
        }
    }

    fn submit(&self, messages: Vec<IrMessage>) -> Result<Outcome, Error> {
        if messages.is_empty() {
            return Ok(Outcome::AlreadySatisfied);
        }
        let (job, receipt) = Job::with_receipt(messages);
        match self.worker.try_submit(job) {
            Ok(()) => Ok(Outcome::Submitted(receipt)),
            Err(nb::Error::WouldBlock) => {
                warn!("Transmission queue full, rejecting command");
                Err(Error::QueueFull)
            }
            Err(nb::Error::Other(e)) => Err(e),
        }
    }

    /// Status string of a device: `ON:100`, `DIMMED:40`, `OFF:0` for the light and
    /// `OFF`, `LOW`, `MED`, `HIGH` for the fan.
    pub fn status(&self, device: Device) -> String {
        match device {
            Device::Light => self.light_state().to_string(),
            Device::Fan => self.fan_speed().to_string(),
        }
    }

    /// Status of a device addressed by name.
    pub fn status_of(&self, device: &str) -> Result<String, Error> {
        Ok(self.status(device.parse()?))
    }

    /// Tracked state of the light.
    pub fn light_state(&self) -> LightState {
        lock(&self.light).state()
    }

    /// Tracked speed of the fan.
    pub fn fan_speed(&self) -> FanSpeed {
        lock(&self.fan).speed()
    }

    /// Jobs waiting to be transmitted.
    pub fn pending(&self) -> usize {
        self.worker.pending()
    }

    /// Transmits everything still queued, then terminates the output device.
    pub fn shutdown(self) -> Result<(), Error> {
        self.worker.shutdown()
    }
}

// A panic while holding the lock cannot leave a translator half-updated: the new state
// is only written after the job is queued.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
