use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identidad de cada paso del arranque, en orden de ejecución.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    SystemRequirements,
    LocalInstall,
    Version,
    RuntimeManager,
    Environment,
    Dependencies,
    LocalServer,
    Plugins,
    Connect,
}

impl StepId {
    /// Todos los pasos en su orden canónico.
    pub const ALL: [StepId; 9] = [StepId::SystemRequirements,
                                  StepId::LocalInstall,
                                  StepId::Version,
                                  StepId::RuntimeManager,
                                  StepId::Environment,
                                  StepId::Dependencies,
                                  StepId::LocalServer,
                                  StepId::Plugins,
                                  StepId::Connect];

    /// Nombre estable (snake_case) usado en logs y eventos.
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::SystemRequirements => "system_requirements",
            StepId::LocalInstall => "local_install",
            StepId::Version => "version",
            StepId::RuntimeManager => "runtime_manager",
            StepId::Environment => "environment",
            StepId::Dependencies => "dependencies",
            StepId::LocalServer => "local_server",
            StepId::Plugins => "plugins",
            StepId::Connect => "connect",
        }
    }

    /// Posición canónica dentro de `ALL`.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown step id: {0}")]
pub struct ParseStepIdError(pub String);

impl FromStr for StepId {
    type Err = ParseStepIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepId::ALL.iter()
                   .copied()
                   .find(|id| id.as_str() == s)
                   .ok_or_else(|| ParseStepIdError(s.to_string()))
    }
}
