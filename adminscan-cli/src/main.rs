use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use adminscan_cli::cli::{Cli, OutputFormat};
use adminscan_cli::console::{Console, DirectoryArtifacts};
use adminscan_cli::error::CliError;
use adminscan_cli::intro::Intro;
use adminscan_cli::logging::init_tracing;
use adminscan_cli::output::{PrinterWriter, sink_for};
use adminscan_cli::repl::{self, Input};
use adminscan_core::config::AdminscanConfig;
use adminscan_core::error::AdminscanError;
use adminscan_core::history::SharedHistory;
use adminscan_stream::{HttpTransport, ScanController};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli).await?;
    init_tracing(&config.general)?;

    info!(
        endpoint = %config.backend.endpoint,
        config = %cli.config.display(),
        "adminscan starting"
    );

    let transport = HttpTransport::new(
        config.backend.endpoint.clone(),
        Duration::from_secs(config.backend.connect_timeout_secs),
    )
    .map_err(AdminscanError::from)?;
    let scans = ScanController::new(Arc::new(transport));
    let artifacts = Box::new(DirectoryArtifacts::new(&config.console.export_dir));

    if !cli.exec.is_empty() {
        let sink = sink_for(cli.output, std::io::stdout(), true);
        let mut console = Console::new(sink, scans, artifacts);
        let failures = console.run_script(&cli.exec).await;
        return match failures {
            0 => Ok(()),
            n => Err(CliError::Command(format!("{n} command(s) failed"))),
        };
    }

    if config.console.show_intro {
        let intro = Intro::new(
            Duration::from_millis(config.console.type_delay_ms),
            Duration::from_millis(config.console.line_delay_ms),
        );
        match cli.output {
            OutputFormat::Text => intro.type_out(&mut std::io::stdout()).await?,
            OutputFormat::Json => {
                let mut sink = sink_for(cli.output, std::io::stdout(), false);
                Intro::render(&mut *sink);
            }
        }
    }

    let history = SharedHistory::new();
    let mut editor = repl::editor(&history)?;
    let printer = editor.create_external_printer()?;
    let sink = sink_for(cli.output, PrinterWriter::new(printer), false);
    let mut console = Console::with_history(sink, scans, artifacts, history);

    let (tx, mut inputs) = mpsc::unbounded_channel();
    repl::spawn_reader(editor, config.console.prompt.clone(), tx);

    loop {
        tokio::select! {
            biased;
            event = console.next_scan_event() => console.apply_scan_event(event),
            input = inputs.recv() => match input {
                Some(Input::Line(line)) => {
                    console.dispatch(&line);
                }
                Some(Input::Interrupt) => {
                    if !console.interrupt() {
                        debug!("interrupt with no active scan");
                    }
                }
                Some(Input::Eof) | None => break,
            },
        }
    }

    if console.interrupt() {
        console.settle().await;
    }
    info!("adminscan exiting");
    Ok(())
}

/// Load file and environment settings, apply flags, then validate once.
async fn load_config(cli: &Cli) -> Result<AdminscanConfig, CliError> {
    let mut config = AdminscanConfig::load_unvalidated(&cli.config).await?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}
