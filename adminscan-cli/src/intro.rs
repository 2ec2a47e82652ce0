//! Startup banner with a typewriter effect.

use std::io::{self, Write};
use std::time::Duration;

use adminscan_core::render::{OutputSink, Tone};

pub const ASCII_ART: &str = "\
░█████╗░░██████╗
██╔══██╗██╔════╝
███████║╚█████╗░
██╔══██║░╚═══██╗
██║░░██║██████╔╝
╚═╝░░╚═╝╚═════╝░";

pub const INTRO_TEXT: [&str; 6] = [
    "AdminScan v2.0.0",
    "Author: JohnDev19",
    "GitHub: https://github.com/JohnDev19",
    "Description: A powerful admin panel finder with real-time scanning capabilities",
    "Type 'help' to see available commands",
    "============================================================",
];

/// Banner pacing.
#[derive(Debug, Clone, Copy)]
pub struct Intro {
    pub type_delay: Duration,
    pub line_delay: Duration,
}

impl Intro {
    pub fn new(type_delay: Duration, line_delay: Duration) -> Self {
        Self {
            type_delay,
            line_delay,
        }
    }

    /// Print the art at once, then type each intro line character by character.
    pub async fn type_out(&self, out: &mut (dyn Write + Send)) -> io::Result<()> {
        writeln!(out, "{ASCII_ART}")?;
        out.flush()?;

        for line in INTRO_TEXT {
            for ch in line.chars() {
                write!(out, "{ch}")?;
                out.flush()?;
                tokio::time::sleep(self.type_delay).await;
            }
            writeln!(out)?;
            out.flush()?;
            tokio::time::sleep(self.line_delay).await;
        }
        Ok(())
    }

    /// Emit the banner as plain lines without pacing.
    pub fn render(sink: &mut dyn OutputSink) {
        for line in ASCII_ART.lines().chain(INTRO_TEXT) {
            sink.line(Tone::Plain, line);
        }
    }
}
