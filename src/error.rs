//! Typed errors for the internet tile
use thiserror::Error;

use crate::network::Transport;

/// Result type alias for tile operations
pub type TileResult<T> = Result<T, TileError>;

/// Errors that can occur while querying the platform or running commands
#[derive(Error, Debug)]
pub enum TileError {
    #[error("Privileged shell access has not been granted")]
    NoPrivilegedAccess,

    #[error("Failed to spawn `{program}`: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed (exit code: {code})")]
    CommandFailed { command: String, code: i32 },

    #[error("Already listening for {0} changes")]
    AlreadyListening(Transport),

    #[error("Unknown network type: {0}")]
    UnknownNetworkType(String),

    #[error("Settings store I/O failed: {0}")]
    Store(#[from] std::io::Error),

    #[error("Settings store is malformed: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TileError {
    /// Whether the error means the privileged channel itself is missing,
    /// as opposed to a command that ran and failed.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, TileError::NoPrivilegedAccess)
    }
}

/// Convert a shell exit code to a short human-readable reason
pub fn exit_code_to_string(code: i32) -> String {
    match code {
        0 => "Success".to_string(),
        1 => "General Failure".to_string(),
        2 => "Usage Error".to_string(),
        126 => "Permission Denied".to_string(),
        127 => "Command Not Found".to_string(),
        130 => "Interrupted".to_string(),
        255 => "Shell Denied".to_string(),
        _ => format!("Unknown Error (Code: {code})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_is_distinct_from_command_failure() {
        assert!(TileError::NoPrivilegedAccess.is_access_denied());
        let failed = TileError::CommandFailed {
            command: "svc data enable".to_string(),
            code: 1,
        };
        assert!(!failed.is_access_denied());
        assert_eq!(
            failed.to_string(),
            "Command `svc data enable` failed (exit code: 1)"
        );
    }

    #[test]
    fn exit_codes_have_readable_names() {
        assert_eq!(exit_code_to_string(127), "Command Not Found");
        assert_eq!(exit_code_to_string(42), "Unknown Error (Code: 42)");
    }
}
