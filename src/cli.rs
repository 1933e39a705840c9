//! Command-line surface for inky-deploy
//!
//! Flags only, no subcommands: one invocation is one pass through the
//! pipeline. Every flag may be repeated without effect, and flag order never
//! changes the step order.

use clap::Parser;

/// inky-deploy - cross-compile and deploy driver for the inky-gotchi e-ink pet
#[derive(Parser, Debug)]
#[command(name = "inky-deploy")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Without flags, a plain debug cross-build is performed.")]
pub struct Cli {
    /// Build in release mode
    #[arg(short, long, overrides_with = "release")]
    pub release: bool,

    /// Remove local build output before building
    #[arg(short, long, overrides_with = "clean")]
    pub clean: bool,

    /// Copy the built binary to the device, killing any running gdbserver first
    #[arg(short, long, overrides_with = "deploy")]
    pub deploy: bool,

    /// Launch a detached gdbserver on the device (implies --deploy)
    #[arg(short, long, overrides_with = "gdbserver")]
    pub gdbserver: bool,

    /// Run the deployed binary on the device interactively
    #[arg(short = 'u', long, overrides_with = "run")]
    pub run: bool,

    /// Output NDJSON events instead of progress text
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
