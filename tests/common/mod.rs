//! Test environment builder for isolated inky-deploy testing.
//!
//! Provides `TestEnv` - an isolated environment with a temp project
//! directory, a temp home, and stub `cross`/`ssh`/`scp` executables placed
//! first on PATH. Each stub appends its argv to a per-tool log so tests can
//! assert exactly which external commands ran, in which order, with which
//! arguments. Stub behavior (reported gdbserver pid, exit codes) is steered
//! through INKY_TEST_* environment variables.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Result of running an inky-deploy CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories and stub tools.
pub struct TestEnv {
    /// Temporary directory for the project (the driver's cwd)
    pub project_root: TempDir,
    /// Temporary directory for HOME
    pub home_dir: TempDir,
    /// Directory holding the stub cross/ssh/scp executables
    stub_bin: TempDir,
    /// Directory the stubs log their invocations into
    log_dir: TempDir,
    /// Extra environment for the driver process
    env_vars: Vec<(String, String)>,
    /// Path to the inky-deploy binary
    deploy_bin: PathBuf,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Run inky-deploy in this environment from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        let path = format!(
            "{}:{}",
            self.stub_bin.path().display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let mut cmd = Command::new(&self.deploy_bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("PATH", path)
            .env("HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("INKY_TEST_LOG_DIR", self.log_dir.path());

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute inky-deploy");
        self.output_to_result(output)
    }

    /// Full recorded invocation log for one stub tool ("" if never called)
    pub fn tool_log(&self, tool: &str) -> String {
        fs::read_to_string(self.log_dir.path().join(format!("{}.log", tool)))
            .unwrap_or_default()
    }

    /// Recorded invocation lines for one stub tool
    pub fn invocations(&self, tool: &str) -> Vec<String> {
        self.tool_log(tool)
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    /// Poll a tool log for a substring, for the detached gdbserver launch
    /// which the driver does not wait on
    pub fn wait_for_log(&self, tool: &str, needle: &str) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.tool_log(tool).contains(needle) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    fn output_to_result(&self, output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Builder for TestEnv
pub struct TestEnvBuilder {
    host: Option<String>,
    gdbserver_pid: Option<u32>,
    run_exit: Option<i32>,
    cross_exit: Option<i32>,
    scp_exit: Option<i32>,
    project_config: Option<String>,
    extra_env: Vec<(String, String)>,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self {
            host: Some("pi@device.test".to_string()),
            gdbserver_pid: None,
            run_exit: None,
            cross_exit: None,
            scp_exit: None,
            project_config: None,
            extra_env: Vec::new(),
        }
    }

    /// ssh destination the driver is pointed at (via INKY_DEPLOY_HOST)
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Leave INKY_DEPLOY_HOST unset so config-file precedence is observable
    pub fn without_host_env(mut self) -> Self {
        self.host = None;
        self
    }

    /// Make the stub `pidof gdbserver` report a running process
    pub fn with_gdbserver_running(mut self, pid: u32) -> Self {
        self.gdbserver_pid = Some(pid);
        self
    }

    /// Exit status the stub remote binary run reports
    pub fn with_run_exit(mut self, code: i32) -> Self {
        self.run_exit = Some(code);
        self
    }

    /// Make the stub cross build fail with this exit code
    pub fn with_cross_exit(mut self, code: i32) -> Self {
        self.cross_exit = Some(code);
        self
    }

    /// Make the stub scp fail with this exit code
    pub fn with_scp_exit(mut self, code: i32) -> Self {
        self.scp_exit = Some(code);
        self
    }

    /// Write an inky-deploy.toml into the project before running
    pub fn with_project_config(mut self, toml: &str) -> Self {
        self.project_config = Some(toml.to_string());
        self
    }

    /// Extra environment for the driver process
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.extra_env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> TestEnv {
        let project_root = TempDir::new().unwrap();
        let home_dir = TempDir::new().unwrap();
        let stub_bin = TempDir::new().unwrap();
        let log_dir = TempDir::new().unwrap();

        write_stub(stub_bin.path(), "cross", CROSS_STUB);
        write_stub(stub_bin.path(), "ssh", SSH_STUB);
        write_stub(stub_bin.path(), "scp", SCP_STUB);

        if let Some(toml) = &self.project_config {
            fs::write(project_root.path().join("inky-deploy.toml"), toml).unwrap();
        }

        let mut env_vars = Vec::new();
        if let Some(host) = &self.host {
            env_vars.push(("INKY_DEPLOY_HOST".to_string(), host.clone()));
        }
        if let Some(pid) = self.gdbserver_pid {
            env_vars.push(("INKY_TEST_PIDOF".to_string(), pid.to_string()));
        }
        if let Some(code) = self.run_exit {
            env_vars.push(("INKY_TEST_RUN_EXIT".to_string(), code.to_string()));
        }
        if let Some(code) = self.cross_exit {
            env_vars.push(("INKY_TEST_CROSS_EXIT".to_string(), code.to_string()));
        }
        if let Some(code) = self.scp_exit {
            env_vars.push(("INKY_TEST_SCP_EXIT".to_string(), code.to_string()));
        }
        env_vars.extend(self.extra_env);

        TestEnv {
            project_root,
            home_dir,
            stub_bin,
            log_dir,
            env_vars,
            deploy_bin: PathBuf::from(env!("CARGO_BIN_EXE_inky-deploy")),
        }
    }
}

impl Default for TestEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_stub(dir: &Path, name: &str, script: &str) {
    let path = dir.join(name);
    fs::write(&path, script).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Stub `cross`: logs argv, honors INKY_TEST_CROSS_EXIT, and drops the
/// artifact where a real cross build would.
const CROSS_STUB: &str = r#"#!/bin/sh
echo "cross $@" >> "$INKY_TEST_LOG_DIR/cross.log"
if [ -n "$INKY_TEST_CROSS_EXIT" ] && [ "$INKY_TEST_CROSS_EXIT" != "0" ]; then
    exit "$INKY_TEST_CROSS_EXIT"
fi
target=""
profile=debug
prev=""
for arg in "$@"; do
    if [ "$prev" = "--target" ]; then target="$arg"; fi
    if [ "$arg" = "--release" ]; then profile=release; fi
    prev="$arg"
done
if [ -n "$target" ]; then
    mkdir -p "target/$target/$profile"
    printf '%s' "$profile" > "target/$target/$profile/${INKY_TEST_BINARY:-inky-gotchi}"
fi
exit 0
"#;

/// Stub `ssh`: logs argv and emulates the three remote commands the driver
/// issues (pidof query, kill, gdbserver launch / interactive run).
const SSH_STUB: &str = r#"#!/bin/sh
echo "ssh $@" >> "$INKY_TEST_LOG_DIR/ssh.log"
case "$*" in
    *"pidof gdbserver"*)
        if [ -n "$INKY_TEST_PIDOF" ]; then
            echo "$INKY_TEST_PIDOF"
            exit 0
        fi
        exit 1
        ;;
    *"nohup gdbserver"*)
        exit 0
        ;;
    *"kill -9"*)
        exit 0
        ;;
    *./*)
        exit "${INKY_TEST_RUN_EXIT:-0}"
        ;;
esac
exit 0
"#;

/// Stub `scp`: logs argv plus whether each local source existed at call
/// time, so tests can assert staging happened before transfer.
const SCP_STUB: &str = r#"#!/bin/sh
echo "scp $@" >> "$INKY_TEST_LOG_DIR/scp.log"
for arg in "$@"; do
    case "$arg" in
        -*) ;;
        *:*) ;;
        *)
            if [ -e "$arg" ]; then
                echo "exists $arg" >> "$INKY_TEST_LOG_DIR/scp.log"
            fi
            ;;
    esac
done
exit "${INKY_TEST_SCP_EXIT:-0}"
"#;
