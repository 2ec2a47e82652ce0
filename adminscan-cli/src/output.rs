//! Output sinks for text vs JSON rendering
//!
//! All console output flows through an [`OutputSink`]. The console only emits
//! tagged lines and progress updates; colors, the progress bar and JSON
//! encoding live here.

use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use rustyline::ExternalPrinter;
use serde::Serialize;
use tracing::debug;

use adminscan_core::render::{OutputSink, Tone};

use crate::cli::OutputFormat;

/// Width of the progress bar in cells.
const BAR_WIDTH: usize = 40;

/// Erase the current terminal line and return the cursor to column 0.
const ERASE_LINE: &str = "\r\x1b[2K";

/// Clear the screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Build the sink for the requested output format, writing to `out`.
///
/// `inline_progress` redraws the progress bar in place; disable it when the
/// writer cannot move the cursor (e.g. when printing above a line editor).
pub fn sink_for<W: Write + Send + 'static>(
    format: OutputFormat,
    out: W,
    inline_progress: bool,
) -> Box<dyn OutputSink + Send> {
    match format {
        OutputFormat::Text => Box::new(TerminalSink::new(out, inline_progress)),
        OutputFormat::Json => Box::new(JsonLineSink::new(out)),
    }
}

/// Colored, human-readable terminal output.
pub struct TerminalSink<W: Write> {
    out: W,
    inline_progress: bool,
    /// Last drawn percentage while the bar is attached.
    bar: Option<u8>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, inline_progress: bool) -> Self {
        Self {
            out,
            inline_progress,
            bar: None,
        }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        if let Err(e) = f(&mut self.out).and_then(|()| self.out.flush()) {
            debug!(error = %e, "failed to write console output");
        }
    }

    fn draw_bar(&mut self, percent: u8) {
        let bar = progress_bar(percent);
        if self.inline_progress {
            self.write(|out| write!(out, "{ERASE_LINE}{bar}"));
        } else {
            self.write(|out| writeln!(out, "{bar}"));
        }
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn line(&mut self, tone: Tone, text: &str) {
        let styled = style(tone, text);
        let redraw = self.bar.filter(|_| self.inline_progress);
        self.write(|out| {
            if redraw.is_some() {
                write!(out, "{ERASE_LINE}")?;
            }
            writeln!(out, "{styled}")
        });
        if let Some(percent) = redraw {
            self.draw_bar(percent);
        }
    }

    fn clear(&mut self) {
        self.write(|out| write!(out, "{CLEAR_SCREEN}"));
        if let Some(percent) = self.bar.filter(|_| self.inline_progress) {
            self.draw_bar(percent);
        }
    }

    fn progress(&mut self, percent: f64) {
        let rounded = percent.clamp(0.0, 100.0).round() as u8;
        // 줄 단위 출력에서는 값이 바뀔 때만 다시 그림
        if !self.inline_progress && self.bar == Some(rounded) {
            return;
        }
        self.bar = Some(rounded);
        self.draw_bar(rounded);
    }

    fn detach_progress(&mut self) {
        if self.bar.take().is_some() && self.inline_progress {
            self.write(|out| write!(out, "{ERASE_LINE}"));
        }
    }
}

fn style(tone: Tone, text: &str) -> ColoredString {
    match tone {
        Tone::Plain => text.normal(),
        Tone::Echo => text.bold(),
        Tone::Info => text.cyan(),
        Tone::Success => text.green(),
        Tone::Warning => text.yellow(),
        Tone::Error => text.red(),
        Tone::Debug => text.bright_black(),
    }
}

/// Render `[█████░░░░░]  50%` with a hue proportional to the value.
fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    let (r, g, b) = hsl_to_rgb(f64::from(percent), 0.7, 0.5);
    format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled).truecolor(r, g, b),
        "░".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}

/// One JSON object per rendered event.
pub struct JsonLineSink<W: Write> {
    out: W,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonRecord<'a> {
    Line { tone: Tone, text: &'a str },
    Clear,
    Progress { percent: f64 },
    ProgressDetached,
}

impl<W: Write> JsonLineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the sink and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &JsonRecord<'_>) {
        let result = serde_json::to_writer(&mut self.out, record)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            debug!(error = %e, "failed to write console output");
        }
    }
}

impl<W: Write> OutputSink for JsonLineSink<W> {
    fn line(&mut self, tone: Tone, text: &str) {
        self.emit(&JsonRecord::Line { tone, text });
    }

    fn clear(&mut self) {
        self.emit(&JsonRecord::Clear);
    }

    fn progress(&mut self, percent: f64) {
        self.emit(&JsonRecord::Progress { percent });
    }

    fn detach_progress(&mut self) {
        self.emit(&JsonRecord::ProgressDetached);
    }
}

/// Writer that prints complete lines above an active line editor prompt.
pub struct PrinterWriter<P: ExternalPrinter> {
    printer: P,
    pending: Vec<u8>,
}

impl<P: ExternalPrinter> PrinterWriter<P> {
    pub fn new(printer: P) -> Self {
        Self {
            printer,
            pending: Vec::new(),
        }
    }
}

impl<P: ExternalPrinter> Write for PrinterWriter<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let text = String::from_utf8_lossy(&line[..end]).into_owned();
            self.printer.print(text).map_err(io::Error::other)?;
        }
        Ok(())
    }
}
