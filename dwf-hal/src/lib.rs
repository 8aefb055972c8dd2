#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod digital;
mod error;
pub mod pins;

#[cfg(feature = "vendor-sdk")]
mod device;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "vendor-sdk")]
#[allow(unsafe_code)]
mod sdk;

pub use digital::{DigitalIo, Direction, LogicLevel};
pub use error::Error;

#[cfg(feature = "vendor-sdk")]
pub use device::Device;
#[cfg(feature = "mock")]
pub use mock::{MockDevice, Operation};
