//! Built-in console commands.

use chrono::Utc;
use tracing::info;

use adminscan_core::error::{CommandError, OptionError};
use adminscan_core::options::VERBOSE;

use super::export::{artifact_name, encode_results};
use super::registry::{Action, Arity, CommandContext, CommandSpec, Registry, Reply};

pub const ABOUT_TEXT: &str = "AdminScanner is a web-based administrative panel finder. \
It helps security researchers and penetration testers locate administrative interfaces \
on web applications through an interactive terminal-like interface.";

/// Registry with every built-in command in `help` order.
pub fn builtin() -> Registry {
    let mut registry = Registry::new();
    for spec in BUILTINS {
        registry.register(*spec);
    }
    registry
}

const BUILTINS: &[CommandSpec] = &[
    CommandSpec {
        name: "scan",
        usage: "scan <url>",
        summary: "Start scanning for admin panels",
        arity: Arity::Any,
        action: Action::Scan,
    },
    CommandSpec {
        name: "stop",
        usage: "stop",
        summary: "Stop the current scan",
        arity: Arity::Any,
        action: Action::Run(stop),
    },
    CommandSpec {
        name: "clear",
        usage: "clear",
        summary: "Clear the terminal",
        arity: Arity::Any,
        action: Action::Run(clear),
    },
    CommandSpec {
        name: "history",
        usage: "history",
        summary: "Show command history",
        arity: Arity::Any,
        action: Action::Run(history),
    },
    CommandSpec {
        name: "about",
        usage: "about",
        summary: "Show tool information",
        arity: Arity::Any,
        action: Action::Run(about),
    },
    CommandSpec {
        name: "config",
        usage: "config",
        summary: "Show current configuration",
        arity: Arity::Any,
        action: Action::Run(config),
    },
    CommandSpec {
        name: "set",
        usage: "set <option> <value>",
        summary: "Set configuration option",
        arity: Arity::Exact(2),
        action: Action::Run(set),
    },
    CommandSpec {
        name: "export",
        usage: "export",
        summary: "Export scan results to file",
        arity: Arity::Any,
        action: Action::Run(export),
    },
    CommandSpec {
        name: "verbose",
        usage: "verbose",
        summary: "Toggle verbose mode",
        arity: Arity::Any,
        action: Action::Run(verbose),
    },
    CommandSpec {
        name: "reset",
        usage: "reset",
        summary: "Reset configuration to defaults",
        arity: Arity::Any,
        action: Action::Run(reset),
    },
    CommandSpec {
        name: "help",
        usage: "help",
        summary: "Show this help message",
        arity: Arity::Any,
        action: Action::Run(help),
    },
];

fn help(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    let mut text = String::from("Available commands:");
    for spec in ctx.registry.iter() {
        text.push_str(&format!("\n  {} - {}", spec.usage, spec.summary));
    }
    Ok(Reply::Text(text))
}

fn stop(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    if ctx.scans.stop() {
        Ok(Reply::text("Scan stopped."))
    } else {
        Ok(Reply::text("No active scan to stop."))
    }
}

fn clear(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    ctx.sink.clear();
    Ok(Reply::Empty)
}

fn history(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    let history = ctx.history.lock();
    if history.is_empty() {
        return Ok(Reply::text("No command history available."));
    }
    let listing: Vec<String> = history
        .list()
        .into_iter()
        .map(|(i, cmd)| format!("{i}. {cmd}"))
        .collect();
    Ok(Reply::Text(listing.join("\n")))
}

fn about(_ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    Ok(Reply::text(ABOUT_TEXT))
}

fn config(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    let mut text = String::from("Current Configuration:");
    for (key, value) in ctx.options.snapshot() {
        text.push_str(&format!("\n  {key}: {value}"));
    }
    Ok(Reply::Text(text))
}

fn set(ctx: &mut CommandContext<'_>, args: &[String]) -> Result<Reply, CommandError> {
    let [key, raw] = args else {
        return Err(CommandError::Usage("Usage: set <option> <value>".to_owned()));
    };
    match ctx.options.set(key, raw) {
        Ok(value) => Ok(Reply::Text(format!("Set {key} to {value}"))),
        Err(OptionError::UnknownOption { .. }) => Ok(Reply::text("Invalid configuration option")),
        Err(e) => Err(e.into()),
    }
}

fn export(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    let results = ctx.scans.results();
    if results.is_empty() {
        return Ok(Reply::text("No results to export"));
    }

    let bytes = encode_results(results).map_err(|e| CommandError::Failed(e.to_string()))?;
    let path = ctx
        .artifacts
        .save(&artifact_name(Utc::now()), &bytes)
        .map_err(|e| CommandError::Failed(format!("failed to write export: {e}")))?;
    info!(path = %path.display(), records = results.len(), "scan results exported");
    Ok(Reply::text("Results exported successfully"))
}

fn verbose(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    let enabled = ctx.options.toggle(VERBOSE)?;
    Ok(Reply::Text(format!(
        "Verbose mode {}",
        if enabled { "enabled" } else { "disabled" }
    )))
}

fn reset(ctx: &mut CommandContext<'_>, _args: &[String]) -> Result<Reply, CommandError> {
    ctx.options.reset();
    Ok(Reply::text("Configuration reset to defaults"))
}
