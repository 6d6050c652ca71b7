//! boot-core: orquestación del arranque del servicio local.
//!
//! Lleva el backend local de "no instalado" a "en ejecución y alcanzable"
//! recorriendo una cadena de pasos dependientes. Piezas:
//! - `step`: identidad, definición y resultados de cada paso.
//! - `registry`: catálogo ordenado e inmutable de pasos.
//! - `poller`: sondeo acotado de intervalo fijo.
//! - `engine`: el orquestador (máquina de estados) y su estado.
//! - `health`: watcher de salud consumido por el paso que arranca el servicio.
//! - `finalizer`: construcción y publicación de la `Connection` terminal.
//! - `event`: registro append-only de transiciones.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod finalizer;
pub mod health;
pub mod poller;
pub mod registry;
pub mod step;

pub use engine::{BootstrapOrchestrator, OrchestratorBuilder, OrchestratorState, StepRun};
pub use errors::{classify, ErrorClass, OrchestratorError, RegistryError, StepError};
pub use event::{BootEvent, BootEventKind, EventStore, InMemoryEventStore};
pub use finalizer::{Connection, ConnectionFinalizer, LocalEndpoint};
pub use health::{ChannelHealthWatcher, HealthWatcher};
pub use poller::{BoundedRetryPoller, CancelHandle, PollOutcome};
pub use registry::{RegistryBuilder, StepRegistry};
pub use step::{check_fn, Confirmation, FnStep, PollSpec, ReadinessCheck, StepDefinition, StepId, StepOutcome, StepStatus, WatchSpec};
