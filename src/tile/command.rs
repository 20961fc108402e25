use std::fmt;

use crate::network::Transport;

/// A radio toggle the controller can ask the executor to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleCommand {
    EnableWifi,
    DisableWifi,
    EnableData,
    DisableData,
}

impl ToggleCommand {
    pub fn enable(transport: Transport) -> Self {
        match transport {
            Transport::Wifi => ToggleCommand::EnableWifi,
            Transport::Cellular => ToggleCommand::EnableData,
        }
    }

    pub fn disable(transport: Transport) -> Self {
        match transport {
            Transport::Wifi => ToggleCommand::DisableWifi,
            Transport::Cellular => ToggleCommand::DisableData,
        }
    }

    pub fn transport(self) -> Transport {
        match self {
            ToggleCommand::EnableWifi | ToggleCommand::DisableWifi => Transport::Wifi,
            ToggleCommand::EnableData | ToggleCommand::DisableData => Transport::Cellular,
        }
    }

    pub fn is_enable(self) -> bool {
        matches!(self, ToggleCommand::EnableWifi | ToggleCommand::EnableData)
    }

    pub fn shell_command(self) -> &'static str {
        match self {
            ToggleCommand::EnableWifi => "svc wifi enable",
            ToggleCommand::DisableWifi => "svc wifi disable",
            ToggleCommand::EnableData => "svc data enable",
            ToggleCommand::DisableData => "svc data disable",
        }
    }
}

impl fmt::Display for ToggleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shell_command())
    }
}

/// Monotonic cycle counter; completions from an older generation are stale
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A toggle command tagged with the cycle that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: Generation,
    pub command: ToggleCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_map_to_svc_invocations() {
        assert_eq!(ToggleCommand::enable(Transport::Wifi).to_string(), "svc wifi enable");
        assert_eq!(ToggleCommand::disable(Transport::Cellular).to_string(), "svc data disable");
        assert_eq!(ToggleCommand::EnableData.transport(), Transport::Cellular);
        assert!(!ToggleCommand::DisableWifi.is_enable());
    }

    #[test]
    fn generations_increase() {
        let first = Generation::default();
        assert!(first.next() > first);
        assert!(first.next().next() > first.next());
        assert_eq!(first.next().next().to_string(), "#2");
    }
}
