use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    // A panic while holding the lock leaves the buffer usable
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log lines are stored instead of being
/// written to stderr, so they don't tear the dashboard.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected lines.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Writer handed to the tracing subscriber. One instance per log event.
pub struct BufferedStderr;

/// `MakeWriter` for `tracing_subscriber::fmt`.
pub fn writer() -> BufferedStderr {
    BufferedStderr
}

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = buffer();
        if let Some(lines) = guard.as_mut() {
            let text = String::from_utf8_lossy(buf);
            lines.extend(text.lines().map(str::to_string));
            Ok(buf.len())
        } else {
            drop(guard);
            io::stderr().write(buf)
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_while_active() {
        activate();
        writer().write_all(b"first line\nsecond line\n").unwrap();
        writer().write_all(b"third line\n").unwrap();
        assert_eq!(drain(), vec!["first line", "second line", "third line"]);
        assert!(drain().is_empty());
    }
}
