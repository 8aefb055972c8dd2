use std::cell::RefCell;

use crate::digital::{self, DigitalIo, Direction, LogicLevel};
use crate::Error;

/// One call that reached a [`MockDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A `set_mode` call.
    SetMode {
        /// The addressed channel.
        channel: u8,
        /// The requested direction.
        direction: Direction,
    },
    /// A `set_state` call.
    SetState {
        /// The addressed channel.
        channel: u8,
        /// The requested level.
        level: LogicLevel,
    },
    /// A `read_input` call.
    ReadInput {
        /// The addressed channel.
        channel: u8,
    },
}

#[derive(Debug, Default)]
struct State {
    output_enable: u32,
    outputs: u32,
    inputs: u32,
    journal: Vec<Operation>,
    remaining_ok: Option<usize>,
}

/// In-memory device used by tests and SDK-less builds.
///
/// Implements [`DigitalIo`] over plain masks, records every call that
/// reaches it in an ordered journal, and can be told to start failing after
/// a number of operations to exercise error paths.
///
/// Channel validation matches the hardware driver, so out-of-range indices
/// fail the same way in both.
#[derive(Debug, Default)]
pub struct MockDevice {
    state: RefCell<State>,
}

impl MockDevice {
    /// Create a device with all lines as low inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation after the next `operations` successful ones fail
    /// with an [`Error::Sdk`].
    pub fn fail_after(&self, operations: usize) {
        self.state.borrow_mut().remaining_ok = Some(operations);
    }

    /// Preset the level read back by [`DigitalIo::read_input`] for a line.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is not one of the DIO lines.
    pub fn set_input(&self, channel: u8, level: LogicLevel) {
        assert!(channel < digital::DIO_LINES, "channel out of range");
        let mut state = self.state.borrow_mut();
        state.inputs = digital::with_line(state.inputs, usize::from(channel), level.into());
    }

    /// Snapshot of the operations performed so far, in order.
    pub fn journal(&self) -> Vec<Operation> {
        self.state.borrow().journal.clone()
    }

    /// Direction a line was last configured with.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is not one of the DIO lines.
    pub fn mode(&self, channel: u8) -> Direction {
        assert!(channel < digital::DIO_LINES, "channel out of range");
        Direction::from(self.state.borrow().output_enable & (1 << channel) != 0)
    }

    fn record(&self, operation: Operation) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.remaining_ok.as_mut() {
            if *remaining == 0 {
                return Err(Error::Sdk(String::from("injected fault")));
            }
            *remaining -= 1;
        }
        state.journal.push(operation);
        Ok(())
    }
}

impl DigitalIo for MockDevice {
    fn set_mode(&self, channel: u8, direction: Direction) -> Result<(), Error> {
        let line = digital::line_index(channel)?;
        self.record(Operation::SetMode { channel, direction })?;
        let mut state = self.state.borrow_mut();
        state.output_enable = digital::with_line(state.output_enable, line, direction.into());
        Ok(())
    }

    fn set_state(&self, channel: u8, level: LogicLevel) -> Result<(), Error> {
        let line = digital::line_index(channel)?;
        self.record(Operation::SetState { channel, level })?;
        let mut state = self.state.borrow_mut();
        state.outputs = digital::with_line(state.outputs, line, level.into());
        Ok(())
    }

    fn output_state(&self, channel: u8) -> Result<LogicLevel, Error> {
        let line = digital::line_index(channel)?;
        Ok(LogicLevel::from(
            self.state.borrow().outputs & (1 << line) != 0,
        ))
    }

    fn read_input(&self, channel: u8) -> Result<LogicLevel, Error> {
        let line = digital::line_index(channel)?;
        self.record(Operation::ReadInput { channel })?;
        Ok(LogicLevel::from(
            self.state.borrow().inputs & (1 << line) != 0,
        ))
    }
}
