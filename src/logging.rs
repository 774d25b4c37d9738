//! Log output. In the page every formatted line goes to the browser console;
//! elsewhere (tests, native tooling) to stderr.

use std::io::{self, Write};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

fn max_level() -> Level {
    if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level())
        .without_time()
        .with_target(false)
        .with_writer(ConsoleMakeWriter)
        .try_init();
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Buffers one formatted event and emits it as a single line when dropped.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn line(&self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        (!line.is_empty()).then(|| line.to_string())
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = self.line() else {
            return;
        };
        emit(&line);
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    let _ = writeln!(io::stderr(), "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_joins_fragments_into_one_line() {
        let mut w = ConsoleWriter::default();
        write!(w, " WARN overlay ").unwrap();
        writeln!(w, "could not be shown").unwrap();
        assert_eq!(w.line().as_deref(), Some(" WARN overlay could not be shown"));
    }

    #[test]
    fn empty_writer_emits_nothing() {
        assert_eq!(ConsoleWriter::default().line(), None);
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        tracing::debug!("logging ready");
    }
}
