//! boot-adapters: colaboradores concretos del arranque local.
//!
//! Este crate provee:
//! - `InstallerClient`: superficie tipada para consultar/mutar el entorno
//!   local, con una implementación basada en comandos configurables.
//! - Clientes HTTP (`reqwest`) para la versión remota, los plugins y la
//!   salud del servicio local, más un watcher de salud por sondeo.
//! - Los nueve pasos concretos del arranque y `standard_registry`.
//!
//! Nota: el core sólo conoce `StepDefinition` y `StepOutcome`; toda la
//! semántica de instalación vive aquí.

pub mod command;
pub mod error;
pub mod http;
pub mod installer;
pub mod steps;
pub mod watcher;

pub use command::{CommandInstallerClient, InstallerCommands, InstallerOp};
pub use error::AdapterError;
pub use http::{HealthProbe, HttpHealthProbe, HttpPluginClient, HttpVersionSource, PluginClient, UnconfiguredVersionSource,
               VersionSource};
pub use installer::{InstallerClient, ReportStatus, StatusReport};
pub use steps::{standard_registry, BootstrapContext, LatestVersion, PollSettings};
pub use watcher::PollingHealthWatcher;
