//! Privileged shell access.
//!
//! Toggling radios needs either root (`su`) or a broker-provided shell
//! (`rish`). Both are plain child processes; the difference is only which
//! binary mediates the grant.

mod executor;

pub use executor::{Completion, CommandExecutor};

use std::io::ErrorKind;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::error::{TileError, TileResult};

/// Captured result of a shell command
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl ShellOutput {
    pub fn success<I, S>(stdout: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: 0,
            stdout: stdout.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: Vec::new(),
            stderr: vec![stderr.into()],
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
    }
}

/// Something that can run a command string with elevated rights
pub trait ShellBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the grant is in place. Must not prompt the user.
    fn has_access(&self) -> bool;

    /// Run `command` to completion. Blocks the calling thread.
    fn run(&self, command: &str) -> TileResult<ShellOutput>;
}

/// Which binary mediates privileged access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Root,
    Rish,
}

impl ShellKind {
    pub fn program(self) -> &'static str {
        match self {
            ShellKind::Root => "su",
            ShellKind::Rish => "rish",
        }
    }
}

/// Runs commands through `su -c` or `rish -c`
#[derive(Debug)]
pub struct ProcessShell {
    kind: ShellKind,
    granted: AtomicBool,
}

impl ProcessShell {
    pub fn new(kind: ShellKind) -> Self {
        Self {
            kind,
            granted: AtomicBool::new(false),
        }
    }

    fn spawn(&self, command: &str) -> TileResult<ShellOutput> {
        let program = self.kind.program();
        let output = Command::new(program)
            .arg("-c")
            .arg(command)
            .output()
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => TileError::NoPrivilegedAccess,
                _ => TileError::CommandSpawn {
                    program: program.to_string(),
                    source,
                },
            })?;

        Ok(ShellOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            stderr: String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(str::to_string)
                .collect(),
        })
    }
}

impl ShellBackend for ProcessShell {
    fn name(&self) -> &str {
        self.kind.program()
    }

    fn has_access(&self) -> bool {
        if self.granted.load(Ordering::Acquire) {
            return true;
        }
        // Grants are only cached once observed; a denial is re-probed next time.
        let granted = self
            .spawn("id -u")
            .map(|output| output.is_success())
            .unwrap_or(false);
        debug!("{} access probe: granted={granted}", self.kind.program());
        if granted {
            self.granted.store(true, Ordering::Release);
        }
        granted
    }

    fn run(&self, command: &str) -> TileResult<ShellOutput> {
        if !self.has_access() {
            return Err(TileError::NoPrivilegedAccess);
        }
        self.spawn(command)
    }
}
