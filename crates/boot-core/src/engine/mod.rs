//! Máquina de estados del arranque.
//!
//! Provee el orquestador, su builder y el estado observable.

pub mod builder;
pub mod orchestrator;
pub mod state;

pub use builder::OrchestratorBuilder;
pub use orchestrator::{BootstrapOrchestrator, StepRun};
pub use state::OrchestratorState;
