//! AdminScan console library.
//!
//! The `adminscan` binary is a thin wrapper around these modules:
//!
//! - [`cli`]: process flags (clap)
//! - [`console`]: command registry, dispatcher and built-in commands
//! - [`output`]: terminal and JSON output sinks
//! - [`intro`]: startup banner
//! - [`repl`]: line editor thread with history key bindings
//! - [`logging`]: tracing subscriber setup
//! - [`error`]: process-level errors and exit codes

pub mod cli;
pub mod console;
pub mod error;
pub mod intro;
pub mod logging;
pub mod output;
pub mod repl;
