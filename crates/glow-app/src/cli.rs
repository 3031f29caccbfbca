use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// glow: layered glow pipeline tooling.
#[derive(Parser, Debug)]
#[command(name = "glow", version, about)]
pub struct Args {
    /// Log level override (debug, info, warn, error) or a full filter
    /// directive.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a glow config and print it as JSON.
    Check {
        file: PathBuf,
    },
    /// Write a starter glow config.
    Init {
        file: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Simulate frames on an in-memory host and print every pass.
    Plan {
        file: PathBuf,
        #[arg(long, default_value_t = 1920)]
        width: u32,
        #[arg(long, default_value_t = 1080)]
        height: u32,
        /// Frames to simulate per run.
        #[arg(long, default_value_t = 2)]
        frames: usize,
        /// Re-plan whenever the file changes.
        #[arg(long)]
        watch: bool,
    },
    /// Run one glow frame on a headless GPU.
    Probe {
        #[arg(long, default_value_t = 256)]
        width: u32,
        #[arg(long, default_value_t = 256)]
        height: u32,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
