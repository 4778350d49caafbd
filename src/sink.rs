//! Output sinks.
//!
//! All printer output goes through an [`OutputSink`]. The default is
//! [`StdoutSink`], which writes to standard output and bolds labels when
//! stdout is a terminal. [`BufferSink`] collects output into a shared buffer
//! for tests or programmatic capture.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Destination for all printer output.
pub trait OutputSink: Send {
    /// Emits one chunk of output. The chunk may span multiple lines; the
    /// sink terminates it with a newline.
    fn emit(&mut self, text: &str);
}

/// Writes output to stdout for default use.
pub struct StdoutSink {
    stream: StandardStream,
    colored: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        let colored = atty::is(atty::Stream::Stdout);
        let choice = if colored {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stream: StandardStream::stdout(choice),
            colored,
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str) {
        for line in text.split('\n') {
            match line.split_once(": ") {
                Some((label, value)) if self.colored => {
                    let _ = self
                        .stream
                        .set_color(ColorSpec::new().set_bold(true));
                    let _ = write!(self.stream, "{}:", label);
                    let _ = self.stream.reset();
                    let _ = writeln!(self.stream, " {}", value);
                }
                _ => {
                    let _ = writeln!(self.stream, "{}", line);
                }
            }
        }
        let _ = self.stream.flush();
    }
}

/// Collects output into a shared string buffer.
///
/// The sink itself is installed process-wide via [`crate::set_sink`]; the
/// handle returned by [`BufferSink::handle`] keeps reading access after the
/// sink has been moved.
pub struct BufferSink {
    buffer: Arc<Mutex<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(String::new())),
        }
    }

    /// A shared handle onto the underlying buffer.
    pub fn handle(&self) -> Arc<Mutex<String>> {
        Arc::clone(&self.buffer)
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for BufferSink {
    fn emit(&mut self, text: &str) {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(text);
        buffer.push('\n');
    }
}
