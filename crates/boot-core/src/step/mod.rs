//! Definiciones relacionadas a Steps.
//!
//! Un Step es una unidad del arranque con una única condición de
//! finalización. Este módulo define:
//! - `StepId`: identidad tipada y ordenada de cada paso.
//! - `StepDefinition`: interfaz neutral que el orquestador invoca.
//! - `StepOutcome` y `Confirmation`: cómo un paso informa su resultado.
//! - `StepStatus`: estado observable de cada paso.

pub mod definition;
mod id;
mod outcome;
mod status;

pub use definition::{FnStep, StepDefinition};
pub use id::{ParseStepIdError, StepId};
pub use outcome::{check_fn, Confirmation, FnCheck, PollSpec, ReadinessCheck, StepOutcome, WatchSpec};
pub use status::StepStatus;
