//! Remote operations over ssh
//!
//! All ssh command lines are built here. The device is addressed by a single
//! ssh destination (user@host); commands run in the remote user's home
//! directory, which is also where the staging directory lands.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{DeployError, DeployResult};

/// A remote device reachable over ssh
pub struct RemoteHost {
    /// ssh destination (user@host or host)
    destination: String,
}

impl RemoteHost {
    /// Create a new RemoteHost for the given ssh destination
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    /// Get the ssh destination
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Run a command on the device, capturing its output
    fn output(&self, command: &str) -> DeployResult<std::process::Output> {
        Command::new("ssh")
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DeployError::ToolUnavailable {
                tool: "ssh".to_string(),
                source: e,
            })
    }

    /// Pid of a running gdbserver on the device, if any
    ///
    /// `pidof` exits non-zero with empty output when no process matches;
    /// that is "not running", not an error.
    pub fn find_gdbserver(&self) -> DeployResult<Option<u32>> {
        let output = self.output("pidof gdbserver")?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let pid = stdout.split_whitespace().next().and_then(|p| p.parse().ok());
        Ok(pid)
    }

    /// Force-kill a process on the device
    ///
    /// The exit status is not checked: the process can legitimately exit
    /// between query and kill.
    pub fn kill(&self, pid: u32) -> DeployResult<()> {
        self.output(&format!("kill -9 {}", pid))?;
        Ok(())
    }

    /// Launch gdbserver on the device, detached
    ///
    /// The remote command backgrounds itself under nohup with its streams
    /// discarded; locally the ssh child is spawned and never awaited.
    pub fn start_gdbserver(&self, port: u16, binary: &Path) -> DeployResult<()> {
        let command = format!(
            "nohup gdbserver localhost:{} {} > /dev/null 2>&1 &",
            port,
            quote_path(binary)
        );

        Command::new("ssh")
            .arg(&self.destination)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DeployError::ToolUnavailable {
                tool: "ssh".to_string(),
                source: e,
            })?;

        Ok(())
    }

    /// Run the deployed binary on the device, interactively
    ///
    /// Allocates a tty (-t) and inherits the local terminal; the remote exit
    /// status is returned so the driver can surface it as its own.
    pub fn run_binary(&self, binary: &Path) -> DeployResult<i32> {
        let status = Command::new("ssh")
            .arg("-t")
            .arg(&self.destination)
            .arg(format!("./{}", quote_path(binary)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| DeployError::ToolUnavailable {
                tool: "ssh".to_string(),
                source: e,
            })?;

        Ok(status.code().unwrap_or(1))
    }
}

/// Quote a path for safe use in remote shell commands
pub fn quote_path(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "'\\''"))
}
