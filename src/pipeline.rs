//! The deploy pipeline
//!
//! A fixed-order sequence gated by the CLI flags:
//! clean, build, kill stale gdbserver, stage, transfer, serve, run.
//! Each step is a function returning a result; progress is surfaced through
//! a `DeployEvent` callback so the binary can render text or NDJSON.

use std::path::PathBuf;

use crate::config::Config;
use crate::cross;
use crate::error::DeployResult;
use crate::remote::RemoteHost;
use crate::stage;

/// Flag state for one pipeline pass
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub release: bool,
    pub clean: bool,
    pub deploy: bool,
    pub gdbserver: bool,
    pub run: bool,
    pub json: bool,
    pub verbose: u8,
}

impl DeployOptions {
    /// Debug serving needs a fresh copy on the device, so --gdbserver
    /// implies the deploy sequence.
    pub fn wants_deploy(&self) -> bool {
        self.deploy || self.gdbserver
    }
}

/// Pipeline event types for progress output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeployEvent {
    CleanStarted {
        path: String,
    },
    CleanFailed {
        message: String,
    },
    BuildStarted {
        target: String,
        release: bool,
    },
    BuildFinished,
    GdbserverKilled {
        pid: u32,
    },
    StagingStarted {
        dir: String,
    },
    TransferStarted {
        destination: String,
    },
    TransferFinished,
    GdbserverStarted {
        port: u16,
    },
    RunStarted {
        binary: String,
    },
    RunFinished {
        code: i32,
    },
}

impl DeployEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// What the pass produced, beyond its side effects
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Exit status of the remote run step, when --run was selected
    pub run_status: Option<i32>,
}

/// Run one pass through the pipeline
///
/// Build, staging, and transfer failures abort with an error. The clean
/// step reports and continues, and the kill step tolerates the gdbserver
/// exiting on its own between query and kill.
pub fn run_pipeline(
    config: &Config,
    options: &DeployOptions,
    mut on_event: impl FnMut(DeployEvent),
) -> DeployResult<PipelineSummary> {
    let root = std::env::current_dir()?;
    let host = RemoteHost::new(&config.device.host);

    if options.clean {
        let build_dir = root.join("target");
        on_event(DeployEvent::CleanStarted {
            path: build_dir.display().to_string(),
        });
        if let Err(e) = cross::clean_build_output(&build_dir) {
            on_event(DeployEvent::CleanFailed {
                message: e.to_string(),
            });
        }
    }

    on_event(DeployEvent::BuildStarted {
        target: config.build.target.clone(),
        release: options.release,
    });
    cross::build(config, options.release, options.json)?;
    on_event(DeployEvent::BuildFinished);

    if options.wants_deploy() {
        if let Some(pid) = host.find_gdbserver()? {
            host.kill(pid)?;
            on_event(DeployEvent::GdbserverKilled { pid });
        }

        on_event(DeployEvent::StagingStarted {
            dir: config.deploy.staging_dir.clone(),
        });
        let staging = stage::stage_artifact(&root, config, options.release)?;

        on_event(DeployEvent::TransferStarted {
            destination: format!("{}:~", host.destination()),
        });
        stage::transfer(
            &staging,
            host.destination(),
            options.verbose > 0,
            options.json,
        )?;
        on_event(DeployEvent::TransferFinished);
    }

    // Path of the deployed binary relative to the remote home directory
    let deployed = PathBuf::from(&config.deploy.staging_dir).join(&config.build.binary);

    if options.gdbserver {
        host.start_gdbserver(config.device.gdb_port, &deployed)?;
        on_event(DeployEvent::GdbserverStarted {
            port: config.device.gdb_port,
        });
    }

    let mut summary = PipelineSummary::default();
    if options.run {
        on_event(DeployEvent::RunStarted {
            binary: deployed.display().to_string(),
        });
        let code = host.run_binary(&deployed)?;
        on_event(DeployEvent::RunFinished { code });
        summary.run_status = Some(code);
    }

    Ok(summary)
}
