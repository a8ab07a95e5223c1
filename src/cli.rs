// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Flags override environment settings; there are no subcommands.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restack")]
#[command(about = "Redeployment control daemon for Docker Swarm services and stacks")]
#[command(version)]
pub struct Cli {
    /// Address to bind the control endpoint to (overrides RESTACK_BIND)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// YAML units file replacing the built-in unit table
    /// (overrides RESTACK_UNITS_FILE)
    #[arg(long)]
    pub units_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
