//! Staging and transfer
//!
//! The deploy step never pushes out of target/ directly: the binary is
//! copied into a disposable staging directory recreated on every run, and
//! that directory is transferred as a whole. The device therefore always
//! receives exactly one coherent payload.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::error::{DeployError, DeployResult};

/// Recreate the staging directory under `root` and copy the built artifact
/// into it
///
/// Returns the staging path. The artifact is taken from the profile the
/// build actually used, so a release build deploys the release binary.
pub fn stage_artifact(root: &Path, config: &Config, release: bool) -> DeployResult<PathBuf> {
    let staging = root.join(&config.deploy.staging_dir);

    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let artifact = root.join(config.artifact_path(release));
    if !artifact.exists() {
        return Err(DeployError::MissingArtifact { path: artifact });
    }

    fs::copy(&artifact, staging.join(&config.build.binary))?;
    Ok(staging)
}

/// Push the staging directory to the device's home directory via `scp -r`
///
/// stdin stays attached so scp can prompt for a password; stdout/stderr are
/// nulled in json mode to keep the event stream machine-readable.
pub fn transfer(staging: &Path, host: &str, verbose: bool, json: bool) -> DeployResult<()> {
    let mut cmd = Command::new("scp");
    cmd.arg("-r");

    if verbose && !json {
        cmd.arg("-v");
    }

    cmd.arg(staging)
        .arg(format!("{}:~", host))
        .stdin(Stdio::inherit());

    if json {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    let status = cmd.status().map_err(|e| DeployError::ToolUnavailable {
        tool: "scp".to_string(),
        source: e,
    })?;

    if !status.success() {
        return Err(DeployError::CommandFailed {
            tool: "scp".to_string(),
            code: status.code(),
        });
    }

    Ok(())
}
