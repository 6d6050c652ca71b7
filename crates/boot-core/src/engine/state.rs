use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finalizer::Connection;
use crate::step::StepStatus;

/// Estado mutable del orquestador. Sólo el orquestador lo modifica; el
/// registro y el poller devuelven resultados que él aplica.
///
/// Invariantes:
/// - `statuses[k] == Success` para todo `k < active_ordinal`.
/// - `busy` es `true` exactamente mientras un paso (o su confirmación) está
///   en vuelo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorState {
    pub active_ordinal: usize,
    pub statuses: BTreeMap<usize, StepStatus>,
    pub error_messages: BTreeMap<usize, String>,
    pub busy: bool,
    pub user_initiated: bool,
    pub torn_down: bool,
    /// Presente cuando el paso terminal tuvo éxito.
    pub connection: Option<Connection>,
}

impl OrchestratorState {
    pub fn new(step_count: usize) -> Self {
        Self { active_ordinal: 0,
               statuses: (0..step_count).map(|k| (k, StepStatus::NotStarted)).collect(),
               error_messages: BTreeMap::new(),
               busy: false,
               user_initiated: false,
               torn_down: false,
               connection: None }
    }

    pub fn status_of(&self, ordinal: usize) -> StepStatus {
        self.statuses.get(&ordinal).copied().unwrap_or_default()
    }

    pub(crate) fn mark_pending(&mut self, ordinal: usize) {
        self.statuses.insert(ordinal, StepStatus::Pending);
        self.error_messages.remove(&ordinal);
    }

    pub(crate) fn mark_error(&mut self, ordinal: usize, message: String) {
        self.statuses.insert(ordinal, StepStatus::Error);
        self.error_messages.insert(ordinal, message);
    }

    /// Marca éxito y avanza salvo que `ordinal` sea el terminal.
    pub(crate) fn mark_success(&mut self, ordinal: usize, terminal: bool) {
        self.statuses.insert(ordinal, StepStatus::Success);
        self.error_messages.remove(&ordinal);
        if !terminal && self.active_ordinal == ordinal {
            self.active_ordinal += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_advances_only_when_not_terminal() {
        let mut st = OrchestratorState::new(2);
        st.mark_pending(0);
        st.mark_success(0, false);
        assert_eq!(st.active_ordinal, 1);
        st.mark_success(1, true);
        assert_eq!(st.active_ordinal, 1);
        assert_eq!(st.status_of(1), StepStatus::Success);
    }

    #[test]
    fn retry_clears_previous_error() {
        let mut st = OrchestratorState::new(1);
        st.mark_error(0, "boom".into());
        assert_eq!(st.error_messages.get(&0).map(String::as_str), Some("boom"));
        st.mark_pending(0);
        assert!(st.error_messages.is_empty());
        assert_eq!(st.status_of(0), StepStatus::Pending);
        assert_eq!(st.status_of(7), StepStatus::NotStarted);
    }
}
