//! Error types for inky-deploy
//!
//! Uses `thiserror` for library errors; the binary wraps these with `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Cross-compilation exited non-zero
    #[error("build failed with exit code {code:?}")]
    BuildFailed { code: Option<i32> },

    /// The binary the deploy step wants to stage was never produced
    #[error("artifact not found: {path} - build before deploying")]
    MissingArtifact { path: PathBuf },

    /// An external tool (ssh, scp) exited non-zero
    #[error("{tool} failed with exit code {code:?}")]
    CommandFailed { tool: String, code: Option<i32> },

    /// An external tool could not be spawned at all
    #[error("could not launch {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file did not parse
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Environment override carried an unusable value
    #[error("invalid value in {var}: {message}")]
    InvalidEnvVar { var: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
