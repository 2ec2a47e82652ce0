//! Line editor thread.
//!
//! `rustyline` blocks while reading, so the editor runs on its own OS thread
//! and forwards input over a channel. Up/Down are bound to the shared history
//! ledger instead of the editor's built-in history.

use std::thread::JoinHandle;

use rustyline::error::ReadlineError;
use rustyline::{
    Cmd, ConditionalEventHandler, DefaultEditor, Event, EventContext, EventHandler, KeyCode,
    KeyEvent, Modifiers, Movement, RepeatCount,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use adminscan_core::history::{Recall, SharedHistory};

use crate::error::CliError;

/// Input forwarded from the editor thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D or a closed terminal.
    Eof,
}

/// Key handler that walks the shared history.
pub struct HistoryRecall {
    history: SharedHistory,
    older: bool,
}

impl HistoryRecall {
    pub fn older(history: SharedHistory) -> Self {
        Self {
            history,
            older: true,
        }
    }

    pub fn newer(history: SharedHistory) -> Self {
        Self {
            history,
            older: false,
        }
    }
}

impl ConditionalEventHandler for HistoryRecall {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        _ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        let mut history = self.history.lock();
        let recall = if self.older {
            history.recall_older()
        } else {
            history.recall_newer()
        };
        Some(recall_command(recall))
    }
}

/// Editor command for a history cursor move.
pub fn recall_command(recall: Recall<'_>) -> Cmd {
    match recall {
        Recall::Entry(line) => Cmd::Replace(Movement::WholeLine, Some(line.to_owned())),
        Recall::Clear => Cmd::Replace(Movement::WholeLine, Some(String::new())),
        Recall::Unchanged => Cmd::Noop,
    }
}

/// Create an editor with Up/Down bound to `history`.
pub fn editor(history: &SharedHistory) -> Result<DefaultEditor, CliError> {
    let mut editor = DefaultEditor::new()?;
    editor.bind_sequence(
        KeyEvent(KeyCode::Up, Modifiers::NONE),
        EventHandler::Conditional(Box::new(HistoryRecall::older(history.clone()))),
    );
    editor.bind_sequence(
        KeyEvent(KeyCode::Down, Modifiers::NONE),
        EventHandler::Conditional(Box::new(HistoryRecall::newer(history.clone()))),
    );
    Ok(editor)
}

/// Read lines on a dedicated thread until EOF or the receiver is dropped.
pub fn spawn_reader(
    mut editor: DefaultEditor,
    prompt: String,
    tx: UnboundedSender<Input>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            let input = match editor.readline(&prompt) {
                Ok(line) => Input::Line(line),
                Err(ReadlineError::Interrupted) => Input::Interrupt,
                Err(ReadlineError::Eof) => Input::Eof,
                Err(e) => {
                    warn!(error = %e, "line editor failed");
                    Input::Eof
                }
            };
            let eof = input == Input::Eof;
            if tx.send(input).is_err() || eof {
                debug!("line editor thread exiting");
                break;
            }
        }
    })
}
