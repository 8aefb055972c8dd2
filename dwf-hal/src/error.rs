use std::fmt;

/// Wrapper for problems when communicating with a WaveForms device.
#[derive(Debug)]
pub enum Error {
    /// Enumeration completed without finding any WaveForms device.
    NoDeviceFound,
    /// A device was enumerated but could not be opened.
    ///
    /// The enclosed string is the message reported by `FDwfGetLastErrorMsg`,
    /// which may be empty if the runtime did not record one.
    OpenFailed(String),
    /// An SDK call reported failure after the session was established.
    ///
    /// The enclosed string is the message reported by `FDwfGetLastErrorMsg`.
    Sdk(String),
    /// A channel index outside the device's DIO lines was requested.
    ChannelOutOfRange {
        /// The requested channel index.
        channel: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoDeviceFound => write!(f, "no WaveForms device found"),
            Error::OpenFailed(message) => write!(f, "could not open device: {message}"),
            Error::Sdk(message) => write!(f, "device call failed: {message}"),
            Error::ChannelOutOfRange { channel } => {
                write!(
                    f,
                    "channel {channel} is outside the device's {} DIO lines",
                    crate::digital::DIO_LINES
                )
            }
        }
    }
}

impl std::error::Error for Error {}
