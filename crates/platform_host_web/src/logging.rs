//! `tracing` subscriber that writes engine and runtime events to the browser console.
//!
//! Each formatted event becomes one console call at the matching severity. Off the browser the
//! same lines go to stderr so host tests and tools see them too.

use std::io;

use tracing::{level_filters::LevelFilter, Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Installs the console subscriber as the global default.
///
/// Debug builds log from `DEBUG` up, release builds only warnings and errors. Returns `false`
/// when a global subscriber was already set, e.g. by an earlier call or by the embedding page.
pub fn init_console_logging() -> bool {
    let max_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .without_time()
        .with_writer(ConsoleMakeWriter)
        .try_init()
        .is_ok()
}

#[derive(Debug, Clone, Copy)]
struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it when dropped.
struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buffer: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = console_line(&self.buffer) {
            emit(self.level, &line);
        }
    }
}

/// Strips the formatter's trailing newline; `None` for an empty event.
fn console_line(buffer: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(buffer);
    let line = line.trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let line = JsValue::from_str(line);
    if level == Level::ERROR {
        console::error_1(&line);
    } else if level == Level::WARN {
        console::warn_1(&line);
    } else if level == Level::INFO {
        console::info_1(&line);
    } else {
        console::debug_1(&line);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn events_are_emitted_one_line_at_a_time() {
        assert_eq!(
            console_line(b" WARN retro_windows::engine: invalid config\n").as_deref(),
            Some(" WARN retro_windows::engine: invalid config")
        );
        assert_eq!(console_line(b"\n"), None);
    }

    #[test]
    fn writers_keep_the_event_level_and_collect_partial_writes() {
        let mut writer = ConsoleMakeWriter.make_writer();
        assert_eq!(writer.level, Level::INFO);
        writer.write_all(b"stale ").expect("buffered");
        writer.write_all(b"window\n").expect("buffered");
        assert_eq!(console_line(&writer.buffer).as_deref(), Some("stale window"));
    }

    #[test]
    fn the_subscriber_installs_once() {
        assert!(init_console_logging());
        assert!(!init_console_logging());
        tracing::debug!(target: "retro_windows", "console subscriber installed");
    }
}
