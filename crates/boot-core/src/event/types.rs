//! Tipos de evento del arranque y estructura `BootEvent`.
//!
//! Rol:
//! - El orquestador emite un evento por cada transición observable.
//! - Los eventos sirven para diagnóstico y tests; el estado vive en
//!   `OrchestratorState` y nunca se reconstruye a partir de ellos.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::StepId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootEventKind {
    /// Primer evento de una sesión: el usuario inició el arranque.
    SessionStarted { step_count: usize },
    /// Se invocó `run` de un paso. No implica éxito.
    StepStarted { ordinal: usize, step_id: StepId },
    /// El paso devolvió `Pending`; `confirmation` es `"poll"` o `"watch"`.
    StepPending { ordinal: usize, step_id: StepId, confirmation: String },
    /// Una comprobación del sondeo terminó.
    PollAttempt { ordinal: usize, attempt: u32, ok: bool },
    StepSucceeded { ordinal: usize, step_id: StepId },
    StepFailed { ordinal: usize, step_id: StepId, message: String },
    /// Conexión terminal publicada.
    Connected { endpoint_url: String },
    TornDown,
}

impl BootEventKind {
    /// Variante compacta para comparar secuencias en tests y logs.
    pub fn variant(&self) -> &'static str {
        match self {
            BootEventKind::SessionStarted { .. } => "I",
            BootEventKind::StepStarted { .. } => "S",
            BootEventKind::StepPending { .. } => "P",
            BootEventKind::PollAttempt { .. } => "A",
            BootEventKind::StepSucceeded { .. } => "F",
            BootEventKind::StepFailed { .. } => "X",
            BootEventKind::Connected { .. } => "C",
            BootEventKind::TornDown => "T",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootEvent {
    pub seq: u64, // orden de append
    pub session_id: Uuid,
    pub kind: BootEventKind,
    pub ts: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_step_ids() {
        let ev = BootEvent { seq: 3,
                             session_id: Uuid::nil(),
                             kind: BootEventKind::StepFailed { ordinal: 4,
                                                               step_id: StepId::Environment,
                                                               message: "boom".into() },
                             ts: Utc::now() };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"]["StepFailed"]["step_id"], "environment");
        let back: BootEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind.variant(), "X");
    }
}
