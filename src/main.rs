//! sshtool binary entry point.

use std::process::ExitCode;

use sshtool::cli;
use sshtool::config::Config;
use sshtool::console::{self, ConsoleOptions};
use sshtool::network::{default_probe, FixedProbe, NetworkProbe};
use sshtool::{logging, Controller, SshToolError};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Try 'sshtool --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    if logging::init_with_filter(config.log_filter()).is_err() {
        eprintln!("warning: logging already initialized");
    }
    info!("sshtool v{}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "session ended with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> sshtool::Result<()> {
    let params = config
        .to_connect_params()
        .map_err(|e| SshToolError::InvalidParams(e.to_string()))?;

    let probe: Box<dyn NetworkProbe> = if config.network.check {
        default_probe()
    } else {
        Box::new(FixedProbe::assumed())
    };

    let (notice_tx, mut notices) = mpsc::unbounded_channel();
    let notice_sink = tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            eprintln!("[sshtool] {notice}");
        }
    });

    let mut controller = Controller::new(probe, notice_tx);
    let result = match controller.connect(&params).await {
        Ok(()) => relay_session(&mut controller, &config).await,
        Err(e) => Err(e),
    };
    controller.shutdown().await;

    drop(controller);
    let _ = notice_sink.await;
    result
}

async fn relay_session<P: NetworkProbe>(
    controller: &mut Controller<P>,
    config: &Config,
) -> sshtool::Result<()> {
    let mut relay = controller
        .start_shell(&config.shell_options(), config.relay_options())
        .await?;

    let options = ConsoleOptions {
        strip_ansi: config.display.strip_ansi,
        ..ConsoleOptions::default()
    };
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let mut stdout = tokio::io::stdout();
    let result = console::run(
        &mut relay,
        console::spawn_stdin_reader(),
        &mut stdout,
        options,
        interrupt,
    )
    .await;

    relay.abort();
    let exit = result?;
    debug!(?exit, "console loop ended");
    Ok(())
}
