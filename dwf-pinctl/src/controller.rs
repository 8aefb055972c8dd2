//! The polling control loop.

use std::io::Write;
use std::thread;
use std::time::Duration;

use dwf_hal::{DigitalIo, Direction, LogicLevel};

use crate::command::{self, write_status};
use crate::poll::LineSource;

/// Idle delay between polls when no input arrived.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Channels configured as outputs and driven high at startup.
pub(crate) const STARTUP_CHANNELS: [u8; 3] = [0, 1, 2];

/// Bring the device to its ready state and announce it.
///
/// The `Ready` line goes out after the channels are configured but before
/// they are driven high; the supervising process keys on that order.
fn initialise<D: DigitalIo>(device: &D, out: &mut impl Write) -> anyhow::Result<()> {
    for channel in STARTUP_CHANNELS {
        device.set_mode(channel, Direction::Output)?;
    }
    write_status(out, format_args!("Ready"))?;
    for channel in STARTUP_CHANNELS {
        device.set_state(channel, LogicLevel::High)?;
    }
    Ok(())
}

/// One poll-and-dispatch cycle. Returns the number of lines drained.
fn run_cycle<D: DigitalIo>(
    device: &D,
    source: &mut impl LineSource,
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let batch = source.poll_lines()?;
    for line in &batch {
        match command::parse_command(line) {
            Some(cmd) => {
                log::debug!("dispatching {cmd:?}");
                cmd.handle(device, out)?;
            }
            None => {
                log::warn!("unrecognised input line {line:?}");
                write_status(out, format_args!("Invalid command"))?;
                write_status(out, format_args!("{batch:?}"))?;
            }
        }
    }
    Ok(batch.len())
}

/// Drive the device from the line source until a device error stops it.
pub(crate) fn run<D: DigitalIo>(
    device: &D,
    source: &mut impl LineSource,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    initialise(device, out)?;
    log::info!("polling for commands");
    loop {
        if run_cycle(device, source, out)? == 0 {
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::time::Instant;

    use dwf_hal::{Error, MockDevice, Operation};

    use super::*;

    /// Replays scripted batches, then reports no input forever.
    struct Script(VecDeque<Vec<String>>);

    impl Script {
        fn new(batches: &[&[&str]]) -> Self {
            Self(
                batches
                    .iter()
                    .map(|batch| batch.iter().map(|line| line.to_string()).collect())
                    .collect(),
            )
        }
    }

    impl LineSource for Script {
        fn poll_lines(&mut self) -> io::Result<Vec<String>> {
            Ok(self.0.pop_front().unwrap_or_default())
        }
    }

    #[test]
    fn startup_configures_channels_then_reports_ready_then_drives_high() {
        let device = MockDevice::new();
        let mut out = Vec::new();

        initialise(&device, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output, "Ready\n");
        let journal = device.journal();
        assert_eq!(journal.len(), 6);
        for (op, channel) in journal[..3].iter().zip(STARTUP_CHANNELS) {
            assert_eq!(
                *op,
                Operation::SetMode {
                    channel,
                    direction: Direction::Output
                }
            );
        }
        for (op, channel) in journal[3..].iter().zip(STARTUP_CHANNELS) {
            assert_eq!(
                *op,
                Operation::SetState {
                    channel,
                    level: LogicLevel::High
                }
            );
        }
    }

    #[test]
    fn set_command_end_to_end() {
        let device = MockDevice::new();
        let mut out = Vec::new();
        let mut source = Script::new(&[&["set=1:1"]]);

        initialise(&device, &mut out).unwrap();
        let handled = run_cycle(&device, &mut source, &mut out).unwrap();

        assert_eq!(handled, 1);
        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("Ready\n"));
        assert!(output.contains("Setting pin 1 to 1"));
        assert_eq!(
            device.journal().last(),
            Some(&Operation::SetState {
                channel: 1,
                level: LogicLevel::High
            })
        );
    }

    #[test]
    fn click_command_end_to_end() {
        let device = MockDevice::new();
        let mut out = Vec::new();
        let mut source = Script::new(&[&["click=2"]]);

        run_cycle(&device, &mut source, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let down = output.find("Clicking pin 2 DOWN").unwrap();
        let up = output.find("Clicking pin 2 UP").unwrap();
        assert!(down < up);
        assert_eq!(
            device.journal(),
            vec![
                Operation::SetState {
                    channel: 2,
                    level: LogicLevel::Low
                },
                Operation::SetState {
                    channel: 2,
                    level: LogicLevel::High
                },
            ]
        );
    }

    #[test]
    fn unrecognised_line_reports_and_dumps_the_batch() {
        let device = MockDevice::new();
        let mut out = Vec::new();
        let mut source = Script::new(&[&["foo"]]);

        run_cycle(&device, &mut source, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Invalid command\n[\"foo\"]\n"
        );
        assert!(device.journal().is_empty());
    }

    #[test]
    fn dump_covers_the_whole_batch_not_just_the_bad_line() {
        let device = MockDevice::new();
        let mut out = Vec::new();
        let mut source = Script::new(&[&["set=1:0", "bar"]]);

        run_cycle(&device, &mut source, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Setting pin 1 to 0"));
        assert!(output.contains("Invalid command\n[\"set=1:0\", \"bar\"]\n"));
    }

    #[test]
    fn device_error_aborts_the_run() {
        let device = MockDevice::new();
        // Startup performs six operations; fail on the first command's.
        device.fail_after(6);
        let mut out = Vec::new();
        let mut source = Script::new(&[&["set=0:1"]]);

        let err = run(&device, &mut source, &mut out).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Sdk(_))
        ));
        // The status line went out before the failing device call.
        assert!(String::from_utf8(out).unwrap().ends_with("Setting pin 0 to 1\n"));
    }

    #[test]
    fn idle_cycles_sleep_before_the_next_poll() {
        let device = MockDevice::new();
        device.fail_after(6);
        let mut out = Vec::new();
        // One empty poll, then a command whose device call fails and ends
        // the loop.
        let mut source = Script::new(&[&[], &["set=0:1"]]);

        let start = Instant::now();
        let _ = run(&device, &mut source, &mut out).unwrap_err();

        assert!(start.elapsed() >= POLL_INTERVAL);
    }
}
