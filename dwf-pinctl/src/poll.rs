//! Non-blocking input polling.

use std::io::{self, Read};

/// Source of input batches for the control loop.
pub(crate) trait LineSource {
    /// Drain every complete line currently available, without blocking.
    ///
    /// An empty batch means there was nothing to read.
    fn poll_lines(&mut self) -> io::Result<Vec<String>>;
}

/// Splits a byte stream into trimmed lines across read boundaries.
///
/// Non-blocking reads can end in the middle of a line; the tail is kept
/// here until its newline arrives.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Split off every complete line received so far.
    pub(crate) fn take_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=newline).collect();
            lines.push(trimmed(&raw));
        }
        lines
    }

    /// Hand out any bytes left after the final newline, as one last line.
    ///
    /// Only meaningful once the stream has ended.
    pub(crate) fn take_remainder(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(trimmed(&std::mem::take(&mut self.pending)))
        }
    }
}

fn trimmed(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

/// Standard-input poller.
///
/// Puts stdin into non-blocking mode once, at construction; each poll then
/// drains whatever is available. End-of-stream stops the reads for good and
/// flushes an unterminated trailing line.
pub(crate) struct StdinPoller {
    buffer: LineBuffer,
    eof: bool,
}

impl StdinPoller {
    pub(crate) fn new() -> io::Result<Self> {
        set_nonblocking()?;
        Ok(Self {
            buffer: LineBuffer::default(),
            eof: false,
        })
    }
}

#[cfg(unix)]
fn set_nonblocking() -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    // SAFETY: fcntl with F_GETFL/F_SETFL on a valid descriptor only touches
    // the descriptor's flag word.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_nonblocking() -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "non-blocking stdin requires a Unix platform",
    ))
}

impl LineSource for StdinPoller {
    fn poll_lines(&mut self) -> io::Result<Vec<String>> {
        if self.eof {
            return Ok(Vec::new());
        }

        let mut chunk = [0u8; 1024];
        let mut stdin = io::stdin().lock();
        loop {
            match stdin.read(&mut chunk) {
                Ok(0) => {
                    log::debug!("input stream closed");
                    self.eof = true;
                    break;
                }
                Ok(read) => self.buffer.extend(&chunk[..read]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }

        let mut lines = self.buffer.take_lines();
        if self.eof {
            lines.extend(self.buffer.take_remainder());
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_split_across_read_boundaries() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"set=1");
        assert!(buffer.take_lines().is_empty());
        buffer.extend(b":1\nclick=");
        assert_eq!(buffer.take_lines(), vec!["set=1:1".to_string()]);
        buffer.extend(b"2\n");
        assert_eq!(buffer.take_lines(), vec!["click=2".to_string()]);
    }

    #[test]
    fn one_chunk_can_carry_several_lines() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"read=1\r\nread=2\n\n");
        // Lines are trimmed; a blank line survives as an empty entry, which
        // the dispatcher reports as an invalid command.
        assert_eq!(
            buffer.take_lines(),
            vec!["read=1".to_string(), "read=2".to_string(), String::new()]
        );
    }

    #[test]
    fn remainder_is_flushed_on_demand() {
        let mut buffer = LineBuffer::default();
        buffer.extend(b"click=7");
        assert!(buffer.take_lines().is_empty());
        assert_eq!(buffer.take_remainder(), Some("click=7".to_string()));
        assert_eq!(buffer.take_remainder(), None);
    }
}
