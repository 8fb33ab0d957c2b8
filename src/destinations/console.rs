//! Console destination

use crate::core::{Destination, Result, WriteMeta};
use std::io::Write;

/// Which standard stream lines are written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes completed lines to stdout or stderr. Lines arrive with their
/// terminator already appended, so no extra newline is added here.
pub struct ConsoleDestination {
    stream: ConsoleStream,
}

impl ConsoleDestination {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }
}

impl Default for ConsoleDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl Destination for ConsoleDestination {
    fn write(&mut self, line: &str, _meta: Option<&WriteMeta>) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(line.as_bytes())?;
            }
            ConsoleStream::Stderr => {
                let stderr = std::io::stderr();
                let mut handle = stderr.lock();
                handle.write_all(line.as_bytes())?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "console:stdout",
            ConsoleStream::Stderr => "console:stderr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_flush() {
        let mut dest = ConsoleDestination::new();
        dest.write("{\"level\":30}\n", None).unwrap();
        dest.flush().unwrap();
    }

    #[test]
    fn test_names() {
        assert_eq!(ConsoleDestination::new().name(), "console:stdout");
        assert_eq!(ConsoleDestination::stderr().name(), "console:stderr");
    }
}
