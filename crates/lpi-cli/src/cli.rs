use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lpi",
    about = "Ledger Plugin Interface: plugin config checks and simulated ledger demos",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a plugin configuration file
    CheckConfig(CheckConfigArgs),
    /// Run a conditional transfer between two plugins on a simulated ledger
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct CheckConfigArgs {
    /// Path to a TOML file with [plugin] and [ledger] sections
    pub path: PathBuf,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Configuration file; a built-in test ledger is used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Account receiving the transfer
    #[arg(long, default_value = "test1.foo.bob")]
    pub peer: String,
    #[arg(long, default_value = "10")]
    pub amount: i64,
    /// Amount credited to the sending connector before the transfer
    #[arg(long, default_value = "100")]
    pub funding: i64,
    /// Have the peer reject the transfer instead of fulfilling it
    #[arg(long)]
    pub reject: bool,
    /// Deliver events through a background queue
    #[arg(long)]
    pub queued: bool,
}
