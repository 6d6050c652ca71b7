//! `InstallerClient` respaldado por comandos de shell configurables.
//!
//! Cada operación se asocia a una línea de comando (p. ej. desde
//! `LOCALBOOT_CMD_INSTALL_LOCALLY`). Interpretación de la salida:
//! - chequeos booleanos: código de salida 0 = `true`;
//! - `check_system_requirements`: salida 0 = sin problemas, en otro caso el
//!   texto emitido es el motivo;
//! - `check_local_version`: stdout recortado;
//! - operaciones de estado: stdout como JSON `{status, message?, data?}`;
//!   si no es JSON válido se deriva del código de salida.

use std::collections::HashMap;
use std::fmt;
use std::process::Output;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;

use crate::error::AdapterError;
use crate::installer::{InstallerClient, StatusReport};

/// Operaciones del instalador, en el orden en que las usa el arranque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallerOp {
    CheckSystemRequirements,
    CheckIfInstalledLocally,
    CheckLocalVersion,
    InstallLocally,
    CheckIfRuntimeManagerExists,
    InstallRuntimeManager,
    CheckIfEnvironmentExists,
    CreateEnvironment,
    CheckDependencies,
    InstallDependencies,
    StartLocalServer,
}

impl InstallerOp {
    pub const ALL: [InstallerOp; 11] = [InstallerOp::CheckSystemRequirements,
                                        InstallerOp::CheckIfInstalledLocally,
                                        InstallerOp::CheckLocalVersion,
                                        InstallerOp::InstallLocally,
                                        InstallerOp::CheckIfRuntimeManagerExists,
                                        InstallerOp::InstallRuntimeManager,
                                        InstallerOp::CheckIfEnvironmentExists,
                                        InstallerOp::CreateEnvironment,
                                        InstallerOp::CheckDependencies,
                                        InstallerOp::InstallDependencies,
                                        InstallerOp::StartLocalServer];

    pub fn as_str(self) -> &'static str {
        match self {
            InstallerOp::CheckSystemRequirements => "check_system_requirements",
            InstallerOp::CheckIfInstalledLocally => "check_if_installed_locally",
            InstallerOp::CheckLocalVersion => "check_local_version",
            InstallerOp::InstallLocally => "install_locally",
            InstallerOp::CheckIfRuntimeManagerExists => "check_if_runtime_manager_exists",
            InstallerOp::InstallRuntimeManager => "install_runtime_manager",
            InstallerOp::CheckIfEnvironmentExists => "check_if_environment_exists",
            InstallerOp::CreateEnvironment => "create_environment",
            InstallerOp::CheckDependencies => "check_dependencies",
            InstallerOp::InstallDependencies => "install_dependencies",
            InstallerOp::StartLocalServer => "start_local_server",
        }
    }

    /// Variable de entorno que contiene el comando de esta operación.
    pub fn env_key(self, prefix: &str) -> String {
        format!("{prefix}{}", self.as_str().to_ascii_uppercase())
    }
}

impl fmt::Display for InstallerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tabla operación -> línea de comando.
#[derive(Debug, Clone, Default)]
pub struct InstallerCommands {
    commands: HashMap<InstallerOp, String>,
}

impl InstallerCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, op: InstallerOp, command: impl Into<String>) -> Self {
        self.commands.insert(op, command.into());
        self
    }

    /// Construye la tabla consultando `lookup(<prefix><OP>)` para cada
    /// operación; las vacías se ignoran.
    pub fn from_lookup<F>(prefix: &str, lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let commands = InstallerOp::ALL.iter()
                                       .filter_map(|op| {
                                           lookup(&op.env_key(prefix)).map(|c| c.trim().to_string())
                                                                      .filter(|c| !c.is_empty())
                                                                      .map(|c| (*op, c))
                                       })
                                       .collect();
        Self { commands }
    }

    pub fn get(&self, op: InstallerOp) -> Option<&str> {
        self.commands.get(&op).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CommandInstallerClient {
    commands: InstallerCommands,
}

impl CommandInstallerClient {
    pub fn new(commands: InstallerCommands) -> Self {
        Self { commands }
    }

    async fn exec(&self, op: InstallerOp) -> Result<Output, AdapterError> {
        let line = self.commands
                       .get(op)
                       .ok_or_else(|| AdapterError::NotConfigured(op.to_string()))?;
        debug!("installer:exec op={op} cmd={line:?}");
        let output = shell(line).output().await?;
        debug!("installer:done op={op} code={:?}", output.status.code());
        Ok(output)
    }

    async fn exec_checked(&self, op: InstallerOp) -> Result<Output, AdapterError> {
        let output = self.exec(op).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(AdapterError::CommandFailed { op: op.to_string(),
                                              code: output.status.code(),
                                              message: best_message(&output) })
        }
    }

    async fn exec_flag(&self, op: InstallerOp) -> Result<bool, AdapterError> {
        Ok(self.exec(op).await?.status.success())
    }

    async fn exec_report(&self, op: InstallerOp) -> Result<StatusReport, AdapterError> {
        let output = self.exec(op).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        match serde_json::from_str::<StatusReport>(stdout.trim()) {
            Ok(report) => Ok(report),
            Err(e) => {
                if !stdout.trim().is_empty() {
                    warn!("installer:report-not-json op={op} err={e}");
                }
                if output.status.success() {
                    Ok(StatusReport::success())
                } else {
                    Ok(StatusReport::error(best_message(&output)))
                }
            }
        }
    }
}

#[async_trait]
impl InstallerClient for CommandInstallerClient {
    async fn check_system_requirements(&self) -> Result<Option<String>, AdapterError> {
        let output = self.exec(InstallerOp::CheckSystemRequirements).await?;
        if output.status.success() {
            Ok(None)
        } else {
            Ok(Some(best_message(&output)))
        }
    }

    async fn check_if_installed_locally(&self) -> Result<bool, AdapterError> {
        self.exec_flag(InstallerOp::CheckIfInstalledLocally).await
    }

    async fn check_local_version(&self) -> Result<String, AdapterError> {
        let output = self.exec_checked(InstallerOp::CheckLocalVersion).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn install_locally(&self) -> Result<(), AdapterError> {
        self.exec_checked(InstallerOp::InstallLocally).await.map(|_| ())
    }

    async fn check_if_runtime_manager_exists(&self) -> Result<bool, AdapterError> {
        self.exec_flag(InstallerOp::CheckIfRuntimeManagerExists).await
    }

    async fn install_runtime_manager(&self) -> Result<(), AdapterError> {
        self.exec_checked(InstallerOp::InstallRuntimeManager).await.map(|_| ())
    }

    async fn check_if_environment_exists(&self) -> Result<StatusReport, AdapterError> {
        self.exec_report(InstallerOp::CheckIfEnvironmentExists).await
    }

    async fn create_environment(&self) -> Result<(), AdapterError> {
        self.exec_checked(InstallerOp::CreateEnvironment).await.map(|_| ())
    }

    async fn check_dependencies(&self) -> Result<StatusReport, AdapterError> {
        self.exec_report(InstallerOp::CheckDependencies).await
    }

    async fn install_dependencies(&self) -> Result<(), AdapterError> {
        self.exec_checked(InstallerOp::InstallDependencies).await.map(|_| ())
    }

    async fn start_local_server(&self) -> Result<StatusReport, AdapterError> {
        self.exec_report(InstallerOp::StartLocalServer).await
    }
}

fn shell(line: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    cmd.arg(line).kill_on_drop(true);
    cmd
}

/// Texto más útil de una salida: stderr, si no stdout, si no el código.
fn best_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    format!("exited with code {:?}", output.status.code())
}
