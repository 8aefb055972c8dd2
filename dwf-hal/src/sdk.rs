//! Checked wrappers over the vendor `dwf` entry points the driver uses.
//!
//! The raw signatures follow the WaveForms SDK header (`dwf.h`). Every call
//! returns a C `int` used as a boolean: non-zero on success, zero on
//! failure, with the failure message retrievable through
//! `FDwfGetLastErrorMsg`. All unsafety is confined to this module; the rest
//! of the crate goes through the safe wrappers below.

use std::ffi::{c_char, c_int, c_uint};

use crate::Error;

/// Device handle as issued by `FDwfDeviceConfigOpen`.
pub(crate) type Hdwf = c_int;

/// The handle value the runtime uses for "no device".
pub(crate) const HDWF_NONE: Hdwf = 0;

/// Enumeration filter matching every device type.
const ENUMFILTER_ALL: c_int = 0;

/// Device id reported for the Analog Discovery 2.
pub(crate) const DEVID_ANALOG_DISCOVERY_2: c_int = 3;

unsafe extern "C" {
    fn FDwfEnum(enumfilter: c_int, device_count: *mut c_int) -> c_int;
    fn FDwfEnumDeviceType(
        device_index: c_int,
        device_id: *mut c_int,
        device_revision: *mut c_int,
    ) -> c_int;
    fn FDwfDeviceConfigOpen(device_index: c_int, config_index: c_int, handle: *mut Hdwf) -> c_int;
    fn FDwfDeviceClose(handle: Hdwf) -> c_int;
    fn FDwfGetLastErrorMsg(message: *mut c_char) -> c_int;

    fn FDwfDigitalIOOutputEnableGet(handle: Hdwf, mask: *mut c_uint) -> c_int;
    fn FDwfDigitalIOOutputEnableSet(handle: Hdwf, mask: c_uint) -> c_int;
    fn FDwfDigitalIOOutputGet(handle: Hdwf, mask: *mut c_uint) -> c_int;
    fn FDwfDigitalIOOutputSet(handle: Hdwf, mask: c_uint) -> c_int;
    fn FDwfDigitalIOStatus(handle: Hdwf) -> c_int;
    fn FDwfDigitalIOInputStatus(handle: Hdwf, mask: *mut c_uint) -> c_int;
}

/// Fetch the runtime's last error message.
///
/// The header fixes the buffer at 512 bytes, NUL-terminated.
pub(crate) fn last_error_message() -> String {
    let mut buffer = [0u8; 512];
    // SAFETY: the runtime writes at most 512 bytes including the terminator.
    let ok = unsafe { FDwfGetLastErrorMsg(buffer.as_mut_ptr().cast::<c_char>()) };
    if ok == 0 {
        return String::new();
    }
    let len = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    String::from_utf8_lossy(&buffer[..len]).trim().to_string()
}

/// Map a boolean-style return code to the crate error.
fn check(ok: c_int) -> Result<(), Error> {
    if ok != 0 {
        Ok(())
    } else {
        Err(Error::Sdk(last_error_message()))
    }
}

/// Number of connected WaveForms devices.
pub(crate) fn device_count() -> Result<c_int, Error> {
    let mut count = 0;
    // SAFETY: `count` outlives the call; the runtime only writes an int.
    check(unsafe { FDwfEnum(ENUMFILTER_ALL, &mut count) })?;
    Ok(count)
}

/// Device id and revision of an enumerated device.
pub(crate) fn device_type(device_index: c_int) -> Result<(c_int, c_int), Error> {
    let mut id = 0;
    let mut revision = 0;
    // SAFETY: both out-parameters outlive the call.
    check(unsafe { FDwfEnumDeviceType(device_index, &mut id, &mut revision) })?;
    Ok((id, revision))
}

/// Attempt to open an enumerated device with its default configuration.
///
/// Returns [`HDWF_NONE`] if the device could not be opened, mirroring the
/// runtime's convention; callers try the next enumeration index.
pub(crate) fn config_open(device_index: c_int) -> Hdwf {
    let mut handle = HDWF_NONE;
    // SAFETY: `handle` outlives the call; a failed open leaves it at
    // HDWF_NONE, which is the value we hand back anyway.
    unsafe { FDwfDeviceConfigOpen(device_index, 0, &mut handle) };
    handle
}

/// Close an open device handle. Failures are not reported by the runtime in
/// any actionable way, so the return code is ignored.
pub(crate) fn close(handle: Hdwf) {
    // SAFETY: closing an already-closed or invalid handle is a no-op.
    unsafe { FDwfDeviceClose(handle) };
}

/// Read the output-enable mask (set bit = line is an output).
pub(crate) fn output_enable_mask(handle: Hdwf) -> Result<u32, Error> {
    let mut mask: c_uint = 0;
    // SAFETY: `mask` outlives the call.
    check(unsafe { FDwfDigitalIOOutputEnableGet(handle, &mut mask) })?;
    Ok(mask)
}

/// Write the output-enable mask.
pub(crate) fn set_output_enable_mask(handle: Hdwf, mask: u32) -> Result<(), Error> {
    // SAFETY: plain by-value call.
    check(unsafe { FDwfDigitalIOOutputEnableSet(handle, mask) })
}

/// Read the currently set output-level mask.
pub(crate) fn output_mask(handle: Hdwf) -> Result<u32, Error> {
    let mut mask: c_uint = 0;
    // SAFETY: `mask` outlives the call.
    check(unsafe { FDwfDigitalIOOutputGet(handle, &mut mask) })?;
    Ok(mask)
}

/// Write the output-level mask.
pub(crate) fn set_output_mask(handle: Hdwf, mask: u32) -> Result<(), Error> {
    // SAFETY: plain by-value call.
    check(unsafe { FDwfDigitalIOOutputSet(handle, mask) })
}

/// Read the level present on the DIO lines.
///
/// `FDwfDigitalIOStatus` latches the pin readings; `FDwfDigitalIOInputStatus`
/// then returns the latched mask.
pub(crate) fn input_mask(handle: Hdwf) -> Result<u32, Error> {
    // SAFETY: plain by-value call.
    check(unsafe { FDwfDigitalIOStatus(handle) })?;
    let mut mask: c_uint = 0;
    // SAFETY: `mask` outlives the call.
    check(unsafe { FDwfDigitalIOInputStatus(handle, &mut mask) })?;
    Ok(mask)
}
