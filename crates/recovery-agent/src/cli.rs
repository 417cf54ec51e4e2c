use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "recoveryd", about = "Replay a recorded recovery event feed against the controller")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a line-delimited JSON event feed and print emitted commands.
    Run(RunOpts),
    /// Replay a feed and print the final recovery report.
    Report(RunOpts),
}

#[derive(clap::Args, Debug)]
pub struct RunOpts {
    /// Path to a line-delimited JSON feed file.
    #[arg(long)]
    pub feed: String,
}
