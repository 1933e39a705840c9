//! Configuration for inky-deploy
//!
//! Precedence, highest first:
//! 1. Environment variables (INKY_DEPLOY_*)
//! 2. Project config (inky-deploy.toml in the working directory)
//! 3. User config (~/.config/inky-deploy/config.toml)
//! 4. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, DeployResult};

/// Project config file name, looked up in the working directory
pub const PROJECT_CONFIG: &str = "inky-deploy.toml";

/// Device (remote host) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// ssh destination, e.g. "pi@raspberrypi.local"
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the remote gdbserver binds on localhost
    #[serde(default = "default_gdb_port")]
    pub gdb_port: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            gdb_port: default_gdb_port(),
        }
    }
}

/// Cross-compilation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Target triple passed to `cross build --target`
    #[serde(default = "default_target")]
    pub target: String,

    /// Name of the produced binary
    #[serde(default = "default_binary")]
    pub binary: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            binary: default_binary(),
        }
    }
}

/// Staging and transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Disposable local directory recreated on every deploy
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_host() -> String {
    "pi@raspberrypi.local".to_string()
}

fn default_gdb_port() -> u16 {
    1234
}

fn default_target() -> String {
    "arm-unknown-linux-gnueabi".to_string()
}

fn default_binary() -> String {
    "inky-gotchi".to_string()
}

fn default_staging_dir() -> String {
    "inky-gotchi-deploy".to_string()
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Non-fatal configuration warning surfaced to CLI users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

impl Config {
    /// Parse a config file, collecting unknown keys as non-fatal warnings
    pub fn load(path: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_keys: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Config = serde_ignored::deserialize(deserializer, |p| {
            unknown_keys.push(p.to_string());
        })
        .map_err(|e| DeployError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_keys
            .into_iter()
            .map(|key| ConfigWarning {
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from project config, user config, or defaults, then apply
    /// environment overrides
    pub fn load_or_default(cwd: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        let project_config = cwd.join(PROJECT_CONFIG);
        let (mut config, warnings) = if project_config.exists() {
            Self::load(&project_config)?
        } else if let Some(user_config) = user_config_path() {
            if user_config.exists() {
                Self::load(&user_config)?
            } else {
                (Self::default(), Vec::new())
            }
        } else {
            (Self::default(), Vec::new())
        };

        config.apply_env_overrides()?;
        Ok((config, warnings))
    }

    /// Apply INKY_DEPLOY_* environment variables on top of file values
    fn apply_env_overrides(&mut self) -> DeployResult<()> {
        if let Ok(host) = std::env::var("INKY_DEPLOY_HOST") {
            if !host.is_empty() {
                self.device.host = host;
            }
        }

        if let Ok(port) = std::env::var("INKY_DEPLOY_GDB_PORT") {
            self.device.gdb_port =
                port.parse()
                    .map_err(|_| DeployError::InvalidEnvVar {
                        var: "INKY_DEPLOY_GDB_PORT".to_string(),
                        message: format!("'{}' is not a port number", port),
                    })?;
        }

        if let Ok(target) = std::env::var("INKY_DEPLOY_TARGET") {
            if !target.is_empty() {
                self.build.target = target;
            }
        }

        if let Ok(binary) = std::env::var("INKY_DEPLOY_BINARY") {
            if !binary.is_empty() {
                self.build.binary = binary;
            }
        }

        if let Ok(dir) = std::env::var("INKY_DEPLOY_STAGING_DIR") {
            if !dir.is_empty() {
                self.deploy.staging_dir = dir;
            }
        }

        Ok(())
    }

    /// Path the cross build drops the binary at, profile matching the flag
    pub fn artifact_path(&self, release: bool) -> PathBuf {
        let profile = if release { "release" } else { "debug" };
        PathBuf::from("target")
            .join(&self.build.target)
            .join(profile)
            .join(&self.build.binary)
    }
}

/// ~/.config/inky-deploy/config.toml (or the platform equivalent)
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("inky-deploy").join("config.toml"))
}
