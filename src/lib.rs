//! inky-deploy - cross-compile and deploy driver for the inky-gotchi e-ink pet
//!
//! Sequences the build/clean/kill/copy/serve/run cycle against an ARM Linux
//! device: invoke `cross` for the target triple, stage the produced binary,
//! push it over scp, and optionally attach a remote gdbserver or run the
//! binary interactively over ssh.

pub mod cli;
pub mod config;
pub mod cross;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod stage;

// Re-exports for convenience
pub use cli::Cli;
pub use config::Config;
pub use error::{DeployError, DeployResult};
pub use pipeline::{run_pipeline, DeployEvent, DeployOptions, PipelineSummary};
pub use remote::RemoteHost;
