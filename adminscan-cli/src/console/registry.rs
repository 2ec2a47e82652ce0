//! Command descriptors and the registry that resolves them.

use adminscan_core::error::CommandError;
use adminscan_core::history::SharedHistory;
use adminscan_core::options::ScanOptions;
use adminscan_core::render::OutputSink;
use adminscan_stream::ScanController;

use super::export::ArtifactSink;

/// Everything a command handler may touch.
///
/// Borrows are disjoint fields of the owning [`Console`](super::Console).
pub struct CommandContext<'a> {
    pub options: &'a mut ScanOptions,
    pub history: &'a SharedHistory,
    pub scans: &'a mut ScanController,
    pub artifacts: &'a dyn ArtifactSink,
    pub sink: &'a mut dyn OutputSink,
    pub registry: &'a Registry,
}

/// Text a handler returns for the console to render verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to render.
    Empty,
    /// Plain text; multi-line text renders as one line per `\n`.
    Text(String),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Handler signature for built-in commands.
pub type Handler = fn(&mut CommandContext<'_>, &[String]) -> Result<Reply, CommandError>;

/// Number of arguments a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Any number of arguments (extra ones are ignored).
    Any,
    /// Exactly `n` arguments.
    Exact(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(n) => n == count,
        }
    }
}

/// What a command does when dispatched.
#[derive(Clone, Copy)]
pub enum Action {
    /// Start a scan with the raw remainder of the line as the target URL.
    Scan,
    /// Run a synchronous handler with the tokenized arguments.
    Run(Handler),
}

/// A tagged command descriptor.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Usage text shown by `help` and on arity mismatch.
    pub usage: &'static str,
    pub summary: &'static str,
    pub arity: Arity,
    pub action: Action,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Command registry in registration order.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    commands: Vec<CommandSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any earlier command with the same name.
    pub fn register(&mut self, spec: CommandSpec) {
        match self.commands.iter_mut().find(|c| c.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.commands.push(spec),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
