//! inky-deploy CLI - cross-compile and deploy driver for inky-gotchi
//!
//! Usage: inky-deploy [-r] [-c] [-d] [-g] [-u]
//!
//! Without flags, performs a plain debug cross-build. Deploy-related flags
//! add the kill/stage/copy/serve/run steps against the configured device.

use std::process;

use anyhow::{Context, Result};
use clap::error::{ContextKind, ErrorKind};
use clap::Parser;

use inky_deploy::{run_pipeline, Cli, Config, DeployEvent, DeployOptions};

fn main() {
    let cli = parse_cli();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("✗ {:#}", err);
            1
        }
    };
    process::exit(code);
}

/// Parse argv, reporting unknown tokens as `Invalid option: <token>`
///
/// Everything else (--help, --version, malformed values) keeps clap's own
/// rendering and exit behavior.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.kind() == ErrorKind::UnknownArgument {
                if let Some(token) = err.get(ContextKind::InvalidArg) {
                    eprintln!("Invalid option: {}", token);
                    process::exit(2);
                }
            }
            err.exit()
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let (config, warnings) = Config::load_or_default(&cwd)?;

    if !cli.json {
        for warning in &warnings {
            eprintln!(
                "⚠ unknown config key '{}' in {}",
                warning.key,
                warning.file.display()
            );
        }
    }

    let options = DeployOptions {
        release: cli.release,
        clean: cli.clean,
        deploy: cli.deploy,
        gdbserver: cli.gdbserver,
        run: cli.run,
        json: cli.json,
        verbose: cli.verbose,
    };

    let json = cli.json;
    let summary = run_pipeline(&config, &options, |event| render(&event, json))?;

    Ok(summary.run_status.unwrap_or(0))
}

fn render(event: &DeployEvent, json: bool) {
    if json {
        println!("{}", event.to_json());
        return;
    }

    match event {
        DeployEvent::CleanStarted { path } => println!("🧹 Cleaning {}", path),
        DeployEvent::CleanFailed { message } => {
            eprintln!("⚠ Clean failed: {} (continuing)", message);
        }
        DeployEvent::BuildStarted { target, release } => {
            let profile = if *release { "release" } else { "debug" };
            println!("🔨 Building {} ({})", target, profile);
        }
        DeployEvent::BuildFinished => println!("✓ Build finished"),
        DeployEvent::GdbserverKilled { pid } => println!("✗ Killed gdbserver (pid {})", pid),
        DeployEvent::StagingStarted { dir } => println!("📦 Staging {}", dir),
        DeployEvent::TransferStarted { destination } => println!("🚀 Copying to {}", destination),
        DeployEvent::TransferFinished => println!("✓ Transfer finished"),
        DeployEvent::GdbserverStarted { port } => {
            println!("🐛 gdbserver listening on localhost:{}", port);
        }
        DeployEvent::RunStarted { binary } => println!("▶ Running {}", binary),
        DeployEvent::RunFinished { code } => println!("✓ Exited with status {}", code),
    }
}
