use std::io;

use clap::Parser;

mod command;
mod controller;
mod poll;

#[cfg(not(any(feature = "mock", feature = "vendor-sdk")))]
compile_error!("enable either the `vendor-sdk` or the `mock` feature");

/// Line-command controller for WaveForms digital I/O pins.
///
/// Reads `set=<pin>:<value>`, `read=<pin>` and `click=<pin>` lines from
/// standard input without blocking and drives the device accordingly.
/// Intended to run as a child process of a supervising server: the `Ready`
/// line on standard output marks the end of startup, status lines follow
/// one per handled command, and diagnostics stay on standard error.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        // The supervising process watches stderr for the raw failure text.
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let device = open_device()?;
    let mut poller = poll::StdinPoller::new()?;
    let stdout = io::stdout();
    // The session closes when `device` drops, including on the error path.
    controller::run(&device, &mut poller, &mut stdout.lock())
}

#[cfg(feature = "vendor-sdk")]
fn open_device() -> Result<dwf_hal::Device, dwf_hal::Error> {
    let device = dwf_hal::Device::open()?;
    if device.is_analog_discovery_2() {
        log::info!("connected to an Analog Discovery 2");
    } else {
        log::info!("connected to a WaveForms device");
    }
    Ok(device)
}

#[cfg(all(feature = "mock", not(feature = "vendor-sdk")))]
fn open_device() -> Result<dwf_hal::MockDevice, dwf_hal::Error> {
    log::warn!("built without the vendor SDK; commands drive an in-memory mock device");
    Ok(dwf_hal::MockDevice::new())
}
