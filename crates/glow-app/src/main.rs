mod cli;
mod commands;
mod planner;

use std::process::ExitCode;

use glow_common::{GlowError, PhysicalSize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Command;

const DEFAULT_LOG_DIRECTIVE: &str = "glow=info";

fn init_logging(log_level: Option<&str>) {
    let directive = log_level.unwrap_or(DEFAULT_LOG_DIRECTIVE);
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(d) => filter.add_directive(d),
        Err(e) => {
            eprintln!("ignoring invalid log level {directive:?}: {e}");
            filter.add_directive(LevelFilter::INFO.into())
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(command: Command) -> glow_common::Result<()> {
    match command {
        Command::Check { file } => commands::check(&file),
        Command::Init { file, force } => commands::init(&file, force),
        Command::Plan {
            file,
            width,
            height,
            frames,
            watch: false,
        } => commands::plan(&file, PhysicalSize::new(width, height), frames),
        Command::Plan {
            file,
            width,
            height,
            frames,
            watch: true,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::plan_watch(
                file,
                PhysicalSize::new(width, height),
                frames,
            ))
        }
        Command::Probe { width, height } => commands::probe(PhysicalSize::new(width, height)),
    }
}

fn main() -> ExitCode {
    let args = cli::parse();
    init_logging(args.log_level.as_deref());

    tracing::debug!("glow v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            if matches!(e, GlowError::Config(_)) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
