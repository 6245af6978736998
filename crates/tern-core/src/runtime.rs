//! Runtime names and introspection types.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered sandbox provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Remote Daytona sandboxes.
    Daytona,
    /// Local filesystem stub.
    E2b,
}

impl RuntimeKind {
    /// Every registered runtime, in registry order.
    pub const ALL: [RuntimeKind; 2] = [RuntimeKind::Daytona, RuntimeKind::E2b];

    /// The runtime's registered name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daytona => "daytona",
            Self::E2b => "e2b",
        }
    }

    /// Registered names joined for error messages.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Daytona,
            _ => Self::E2b,
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daytona" => Ok(Self::Daytona),
            "e2b" => Ok(Self::E2b),
            _ => Err(CoreError::UnknownRuntime {
                name: s.to_string(),
                available: Self::names(),
            }),
        }
    }
}

/// Snapshot of the runtime selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    /// Currently selected runtime.
    pub runtime: RuntimeKind,
    /// Every registered runtime, regardless of configuration.
    pub available_runtimes: Vec<RuntimeKind>,
}

/// Result of a successful runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchOutcome {
    pub previous: RuntimeKind,
    pub current: RuntimeKind,
}

/// Configuration check for one runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeProbe {
    pub runtime: RuntimeKind,
    pub is_configured: bool,
    /// Redacted view of the settings the runtime reads.
    pub configuration: serde_json::Value,
}
