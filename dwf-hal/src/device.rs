use crate::digital::{self, DigitalIo, Direction, LogicLevel};
use crate::sdk::{self, Hdwf};
use crate::Error;

/// An open session on a WaveForms device.
///
/// # Quick start
///
/// Call [`Device::open`] to connect to the first device the runtime
/// enumerates. The session stays open for the lifetime of the value and the
/// underlying handle is released when it is dropped, so an early return or
/// error path can never leave the device claimed.
///
/// Digital I/O goes through the [`DigitalIo`] trait: configure a line with
/// [`DigitalIo::set_mode`], then drive it with [`DigitalIo::set_state`].
///
/// The vendor runtime is not thread safe and the handle is used from one
/// thread at a time; the struct is deliberately not `Sync`.
#[derive(Debug)]
pub struct Device {
    handle: Hdwf,
    device_id: Option<i32>,
    // The dwf runtime keeps mutable per-handle state on its side.
    _not_sync: std::marker::PhantomData<std::cell::Cell<()>>,
}

impl Device {
    /// Connect to the first WaveForms device that can be opened.
    ///
    /// Enumerates all connected devices and opens the first one that accepts
    /// its default configuration, in enumeration order.
    ///
    /// # Errors
    ///
    /// [`Error::NoDeviceFound`] if enumeration finds nothing,
    /// [`Error::OpenFailed`] if no enumerated device could be opened.
    pub fn open() -> Result<Self, Error> {
        let count = sdk::device_count()?;
        if count <= 0 {
            return Err(Error::NoDeviceFound);
        }

        for index in 0..count {
            let handle = sdk::config_open(index);
            if handle != sdk::HDWF_NONE {
                // Informational only; anything that speaks the digital-IO
                // commands is acceptable.
                let device_id = sdk::device_type(index).ok().map(|(id, _revision)| id);
                return Ok(Self {
                    handle,
                    device_id,
                    _not_sync: std::marker::PhantomData,
                });
            }
        }

        Err(Error::OpenFailed(sdk::last_error_message()))
    }

    /// Whether the opened device identified itself as an Analog Discovery 2.
    pub fn is_analog_discovery_2(&self) -> bool {
        self.device_id == Some(sdk::DEVID_ANALOG_DISCOVERY_2)
    }

    /// Close the session.
    ///
    /// Dropping the value does the same; this method only exists to make the
    /// release point explicit at call sites that want one.
    pub fn close(self) {}
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.handle != sdk::HDWF_NONE {
            sdk::close(self.handle);
            self.handle = sdk::HDWF_NONE;
        }
    }
}

impl DigitalIo for Device {
    fn set_mode(&self, channel: u8, direction: Direction) -> Result<(), Error> {
        let line = digital::line_index(channel)?;
        let mask = sdk::output_enable_mask(self.handle)?;
        sdk::set_output_enable_mask(self.handle, digital::with_line(mask, line, direction.into()))
    }

    fn set_state(&self, channel: u8, level: LogicLevel) -> Result<(), Error> {
        let line = digital::line_index(channel)?;
        let mask = sdk::output_mask(self.handle)?;
        sdk::set_output_mask(self.handle, digital::with_line(mask, line, level.into()))
    }

    fn output_state(&self, channel: u8) -> Result<LogicLevel, Error> {
        let line = digital::line_index(channel)?;
        let mask = sdk::output_mask(self.handle)?;
        Ok(LogicLevel::from(mask & (1 << line) != 0))
    }

    fn read_input(&self, channel: u8) -> Result<LogicLevel, Error> {
        let line = digital::line_index(channel)?;
        let mask = sdk::input_mask(self.handle)?;
        Ok(LogicLevel::from(mask & (1 << line) != 0))
    }
}
