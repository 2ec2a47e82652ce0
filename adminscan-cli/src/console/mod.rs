//! The command interpreter.
//!
//! A [`Console`] owns all interactive state: scan options, the command
//! history, the scan controller, and the output sink. Input lines go through
//! [`Console::dispatch`]; scan events are pulled with
//! [`Console::next_scan_event`] and applied with [`Console::apply_scan_event`]
//! so the caller can interleave them with user input.

pub mod commands;
pub mod export;
pub mod registry;

use tracing::warn;

use adminscan_core::history::SharedHistory;
use adminscan_core::options::ScanOptions;
use adminscan_core::render::{OutputSink, Tone, render_fault};
use adminscan_stream::{ScanController, ScanEvent, ScanState};

pub use export::{ArtifactSink, DirectoryArtifacts};
pub use registry::{Action, Arity, CommandContext, CommandSpec, Handler, Registry, Reply};

const UNKNOWN_COMMAND: &str = "Unknown command. Type \"help\" for available commands.";
const MISSING_URL: &str = "Please provide a URL to scan.";

/// Outcome of dispatching one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank input; nothing was recorded or rendered.
    Ignored,
    /// The command ran and its reply was rendered.
    Completed,
    /// A scan session was started; its events arrive later.
    ScanStarted,
    /// The line was rejected or the command faulted. The fault was rendered.
    Failed,
}

/// Interactive console state.
pub struct Console<S: OutputSink> {
    sink: S,
    options: ScanOptions,
    history: SharedHistory,
    scans: ScanController,
    artifacts: Box<dyn ArtifactSink>,
    registry: Registry,
}

impl<S: OutputSink> Console<S> {
    pub fn new(sink: S, scans: ScanController, artifacts: Box<dyn ArtifactSink>) -> Self {
        Self::with_history(sink, scans, artifacts, SharedHistory::new())
    }

    /// Build a console that records into an existing history handle.
    pub fn with_history(
        sink: S,
        scans: ScanController,
        artifacts: Box<dyn ArtifactSink>,
        history: SharedHistory,
    ) -> Self {
        Self {
            sink,
            options: ScanOptions::default(),
            history,
            scans,
            artifacts,
            registry: commands::builtin(),
        }
    }

    /// Register an extra command, replacing a built-in with the same name.
    pub fn register(&mut self, spec: CommandSpec) {
        self.registry.register(spec);
    }

    /// Interpret one input line.
    pub fn dispatch(&mut self, raw: &str) -> Dispatch {
        let line = raw.trim();
        if line.is_empty() {
            return Dispatch::Ignored;
        }

        self.history.lock().record(line);
        self.sink.line(Tone::Echo, &format!("$ {line}"));

        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Dispatch::Ignored;
        };
        let args: Vec<String> = tokens.map(str::to_owned).collect();

        let Some(spec) = self.registry.get(name).copied() else {
            warn!(command = name, "unknown command");
            self.sink.line(Tone::Error, UNKNOWN_COMMAND);
            return Dispatch::Failed;
        };

        match spec.action {
            // The URL is the raw remainder; embedded whitespace is kept.
            Action::Scan => self.start_scan(line[name.len()..].trim()),
            Action::Run(handler) => self.run(&spec, handler, &args),
        }
    }

    fn start_scan(&mut self, url: &str) -> Dispatch {
        if url.is_empty() {
            self.sink.line(Tone::Error, MISSING_URL);
            return Dispatch::Failed;
        }

        match self.scans.start(url, &self.options) {
            Ok(_) => Dispatch::ScanStarted,
            Err(e) => {
                self.sink.line(Tone::Error, &e.to_string());
                Dispatch::Failed
            }
        }
    }

    fn run(&mut self, spec: &CommandSpec, handler: Handler, args: &[String]) -> Dispatch {
        if !spec.arity.accepts(args.len()) {
            self.sink.line(Tone::Plain, &format!("Usage: {}", spec.usage));
            return Dispatch::Failed;
        }

        let mut ctx = CommandContext {
            options: &mut self.options,
            history: &self.history,
            scans: &mut self.scans,
            artifacts: self.artifacts.as_ref(),
            sink: &mut self.sink,
            registry: &self.registry,
        };

        match handler(&mut ctx, args) {
            Ok(Reply::Empty) => Dispatch::Completed,
            Ok(Reply::Text(text)) => {
                for line in text.lines() {
                    self.sink.line(Tone::Plain, line);
                }
                Dispatch::Completed
            }
            Err(e) if e.is_status() => {
                self.sink.line(Tone::Plain, &e.to_string());
                Dispatch::Failed
            }
            Err(e) => {
                warn!(command = spec.name, error = %e, "command failed");
                render_fault(&mut self.sink, "Command failed", &e, self.options.verbose());
                Dispatch::Failed
            }
        }
    }

    /// Wait for the next event of the active scan. Pending while idle.
    pub async fn next_scan_event(&mut self) -> ScanEvent {
        self.scans.next_event().await
    }

    pub fn apply_scan_event(&mut self, event: ScanEvent) {
        self.scans.apply(event, &mut self.sink, &self.options);
    }

    /// Apply scan events until no scan is active.
    pub async fn settle(&mut self) {
        self.scans
            .wait_until_idle(&mut self.sink, &self.options)
            .await;
    }

    /// Ctrl-C handling: stop the active scan. Returns `false` when idle.
    pub fn interrupt(&mut self) -> bool {
        self.scans.stop()
    }

    /// Run lines in order, letting each scan finish before the next line.
    ///
    /// Returns the number of lines that failed.
    pub async fn run_script<I>(&mut self, lines: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut failures = 0;
        for line in lines {
            match self.dispatch(line.as_ref()) {
                Dispatch::Failed => failures += 1,
                Dispatch::ScanStarted => {
                    self.settle().await;
                    if self.scans.state() != ScanState::Completed {
                        failures += 1;
                    }
                }
                Dispatch::Ignored | Dispatch::Completed => {}
            }
        }
        failures
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    pub fn scans(&self) -> &ScanController {
        &self.scans
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
