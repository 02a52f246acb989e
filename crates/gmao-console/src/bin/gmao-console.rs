//! CLI entrypoint for the GMAO floor console.

#[path = "gmao-console/cli.rs"]
mod cli;
#[path = "gmao-console/completions.rs"]
mod completions;
#[path = "gmao-console/send.rs"]
mod send;
#[path = "gmao-console/snapshot.rs"]
mod snapshot;
#[path = "gmao-console/style.rs"]
mod style;

use anyhow::Context;
use clap::Parser;

use gmao_console::config::ConsoleConfig;
use gmao_console::ui;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    if let Err(err) = run() {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut console_config = ConsoleConfig::load_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        console_config.server_url = url.as_str().into();
    }
    init_logging(&cli, &console_config)?;

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => ui::run_ui(&console_config),
        Command::Send { action } => send::run_send(&console_config, &action),
        Command::Snapshot { timeout } => snapshot::run_snapshot(&console_config, timeout),
        Command::Completions { shell } => completions::run_completions(shell),
    }
}

fn init_logging(cli: &Cli, console_config: &ConsoleConfig) -> anyhow::Result<()> {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        console_config
            .log_level
            .parse::<tracing::Level>()
            .context("parsing [log] level")?
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    let interactive = matches!(cli.command, None | Some(Command::Ui));

    if let Some(path) = &console_config.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if interactive {
        // the alternate screen owns the terminal; without a log file the
        // records have nowhere safe to go
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
