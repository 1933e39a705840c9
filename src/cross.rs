//! Cross-compilation step
//!
//! Shells out to `cross` (https://github.com/cross-rs/cross) for the
//! configured target triple. The build's own output goes straight to the
//! terminal; in json mode it is nulled so the event stream stays clean.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::error::{DeployError, DeployResult};

/// Remove the local build output tree
///
/// A missing directory counts as success. Other failures are reported by the
/// caller but do not stop the pipeline.
pub fn clean_build_output(build_dir: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(build_dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Invoke `cross build --target <triple>`, with `--release` only in release
/// mode. A non-zero exit aborts the pipeline.
pub fn build(config: &Config, release: bool, json: bool) -> DeployResult<()> {
    let mut cmd = Command::new("cross");
    cmd.arg("build").arg("--target").arg(&config.build.target);

    if release {
        cmd.arg("--release");
    }

    if json {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    let status = cmd.status().map_err(|e| DeployError::ToolUnavailable {
        tool: "cross".to_string(),
        source: e,
    })?;

    if !status.success() {
        return Err(DeployError::BuildFailed {
            code: status.code(),
        });
    }

    Ok(())
}
