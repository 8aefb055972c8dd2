//! Typed views of single DIO lines.
//!
//! [`Output`] and [`Input`] borrow the device session and implement the
//! [`embedded_hal::digital`] traits, so a line can be handed to any driver
//! expecting an `OutputPin` or `InputPin`. The wrappers are generic over
//! [`DigitalIo`], which means they drive the mock device in tests exactly
//! like the hardware.

use crate::Error;
use crate::digital::{DigitalIo, Direction, LogicLevel};

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        // No variant maps onto a more specific embedded-hal kind.
        embedded_hal::digital::ErrorKind::Other
    }
}

/// A DIO line in output mode.
#[derive(Debug)]
pub struct Output<'a, D: DigitalIo> {
    port: &'a D,
    channel: u8,
}

impl<'a, D: DigitalIo> Output<'a, D> {
    /// Configure the line as an output and wrap it.
    pub fn new(port: &'a D, channel: u8) -> Result<Self, Error> {
        port.set_mode(channel, Direction::Output)?;
        Ok(Self { port, channel })
    }

    /// Set the output level of this line.
    pub fn set_level(&self, level: LogicLevel) -> Result<(), Error> {
        self.port.set_state(self.channel, level)
    }

    /// Get the currently set output level of this line.
    pub fn level(&self) -> Result<LogicLevel, Error> {
        self.port.output_state(self.channel)
    }

    /// Switch the line to input mode.
    pub fn into_input(self) -> Result<Input<'a, D>, Error> {
        Input::new(self.port, self.channel)
    }
}

impl<D: DigitalIo> embedded_hal::digital::ErrorType for Output<'_, D> {
    type Error = Error;
}

impl<D: DigitalIo> embedded_hal::digital::OutputPin for Output<'_, D> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(LogicLevel::High)
    }
}

impl<D: DigitalIo> embedded_hal::digital::StatefulOutputPin for Output<'_, D> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.level().map(LogicLevel::is_high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.level().map(LogicLevel::is_low)
    }
}

/// A DIO line in input mode.
#[derive(Debug)]
pub struct Input<'a, D: DigitalIo> {
    port: &'a D,
    channel: u8,
}

impl<'a, D: DigitalIo> Input<'a, D> {
    /// Configure the line as an input and wrap it.
    pub fn new(port: &'a D, channel: u8) -> Result<Self, Error> {
        port.set_mode(channel, Direction::Input)?;
        Ok(Self { port, channel })
    }

    /// Read the level present on this line.
    pub fn level(&self) -> Result<LogicLevel, Error> {
        self.port.read_input(self.channel)
    }

    /// Switch the line to output mode.
    pub fn into_output(self) -> Result<Output<'a, D>, Error> {
        Output::new(self.port, self.channel)
    }
}

impl<D: DigitalIo> embedded_hal::digital::ErrorType for Input<'_, D> {
    type Error = Error;
}

impl<D: DigitalIo> embedded_hal::digital::InputPin for Input<'_, D> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.level().map(LogicLevel::is_high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.level().map(LogicLevel::is_low)
    }
}
