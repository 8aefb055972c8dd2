//! The command grammar and its handlers.

use std::fmt;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use dwf_hal::{DigitalIo, LogicLevel};
use once_cell::sync::Lazy;
use regex::Regex;

/// Width of the low pulse produced by a click command.
pub(crate) const CLICK_PULSE: Duration = Duration::from_millis(100);

static SET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^set=(\d+):(\d+)").expect("hard-coded pattern"));
static READ_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^read=(\d+)").expect("hard-coded pattern"));
static CLICK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^click=(\d+)").expect("hard-coded pattern"));

/// A recognised input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Set { pin: u8, value: u32 },
    Read { pin: u8 },
    Click { pin: u8 },
}

/// Parse one trimmed input line.
///
/// The patterns are anchored at the start of the line only, so trailing
/// text after a recognised command is ignored. A captured integer too large
/// for its type makes the whole line unrecognised; no such pin could
/// address a DIO line anyway.
pub(crate) fn parse_command(line: &str) -> Option<Command> {
    if let Some(caps) = SET_PATTERN.captures(line) {
        return Some(Command::Set {
            pin: caps[1].parse().ok()?,
            value: caps[2].parse().ok()?,
        });
    }
    if let Some(caps) = READ_PATTERN.captures(line) {
        return Some(Command::Read {
            pin: caps[1].parse().ok()?,
        });
    }
    if let Some(caps) = CLICK_PATTERN.captures(line) {
        return Some(Command::Click {
            pin: caps[1].parse().ok()?,
        });
    }
    None
}

/// Write one protocol line and flush it.
///
/// The supervising process reads our stdout through a pipe, so a line must
/// never sit in the buffer.
pub(crate) fn write_status(out: &mut impl Write, message: fmt::Arguments<'_>) -> io::Result<()> {
    writeln!(out, "{message}")?;
    out.flush()
}

impl Command {
    /// Run the command against the device session.
    pub(crate) fn handle<D: DigitalIo>(&self, device: &D, out: &mut impl Write) -> anyhow::Result<()> {
        match *self {
            Command::Set { pin, value } => {
                write_status(out, format_args!("Setting pin {pin} to {value}"))?;
                device.set_state(pin, LogicLevel::from(value == 1))?;
            }
            Command::Read { pin } => {
                // The protocol defines no reply payload for reads; the
                // status line is the entire observable effect.
                write_status(out, format_args!("Reading pin {pin}"))?;
            }
            Command::Click { pin } => {
                write_status(out, format_args!("Clicking pin {pin} DOWN"))?;
                device.set_state(pin, LogicLevel::Low)?;
                thread::sleep(CLICK_PULSE);
                write_status(out, format_args!("Clicking pin {pin} UP"))?;
                device.set_state(pin, LogicLevel::High)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use dwf_hal::{MockDevice, Operation};

    use super::*;

    #[test]
    fn recognises_the_three_verbs() {
        assert_eq!(
            parse_command("set=1:1"),
            Some(Command::Set { pin: 1, value: 1 })
        );
        assert_eq!(
            parse_command("set=12:0"),
            Some(Command::Set { pin: 12, value: 0 })
        );
        assert_eq!(parse_command("read=3"), Some(Command::Read { pin: 3 }));
        assert_eq!(parse_command("click=2"), Some(Command::Click { pin: 2 }));
    }

    #[test]
    fn rejects_everything_else() {
        for line in ["", "foo", "set=1", "set=:1", "set=1:-1", "read=", "CLICK=2"] {
            assert_eq!(parse_command(line), None, "line {line:?}");
        }
    }

    #[test]
    fn matches_are_prefix_anchored_only() {
        // Only the start of the line is anchored; trailing garbage after a
        // recognised command is accepted and ignored.
        assert_eq!(
            parse_command("set=1:10x"),
            Some(Command::Set { pin: 1, value: 10 })
        );
        assert_eq!(parse_command("click=2 now"), Some(Command::Click { pin: 2 }));
        // But a recognised verb must start the line.
        assert_eq!(parse_command(" click=2"), None);
    }

    #[test]
    fn oversized_pin_literals_are_unrecognised() {
        assert_eq!(parse_command("set=999:1"), None);
        assert_eq!(parse_command("click=4294967296"), None);
    }

    #[test]
    fn set_drives_high_only_for_value_one() {
        let device = MockDevice::new();
        let mut out = Vec::new();

        Command::Set { pin: 1, value: 1 }
            .handle(&device, &mut out)
            .unwrap();
        Command::Set { pin: 2, value: 7 }
            .handle(&device, &mut out)
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Setting pin 1 to 1\nSetting pin 2 to 7\n"
        );
        assert_eq!(
            device.journal(),
            vec![
                Operation::SetState {
                    channel: 1,
                    level: LogicLevel::High
                },
                Operation::SetState {
                    channel: 2,
                    level: LogicLevel::Low
                },
            ]
        );
    }

    #[test]
    fn click_pulses_low_then_high() {
        let device = MockDevice::new();
        let mut out = Vec::new();

        let start = Instant::now();
        Command::Click { pin: 2 }.handle(&device, &mut out).unwrap();

        assert!(start.elapsed() >= CLICK_PULSE);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Clicking pin 2 DOWN\nClicking pin 2 UP\n"
        );
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
    fn read_only_reports() {
        let device = MockDevice::new();
        let mut out = Vec::new();

        Command::Read { pin: 4 }.handle(&device, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Reading pin 4\n");
        assert!(device.journal().is_empty());
    }
}
