use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{BootEvent, BootEventKind};

/// Bitácora del arranque. El orquestador escribe en ella con su lock
/// tomado, así que el orden de `seq` es el orden en que se aplicaron los
/// cambios de estado.
pub trait EventStore: Send {
    /// Anota `kind` en la bitácora de `session_id`. `seq` empieza en 0 para
    /// cada sesión y no tiene huecos.
    fn append_kind(&mut self, session_id: Uuid, kind: BootEventKind) -> BootEvent;
    /// Bitácora completa de la sesión; vacía si nunca arrancó.
    fn list(&self, session_id: Uuid) -> Vec<BootEvent>;
}

/// Bitácora en memoria: vive lo que vive el orquestador.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<BootEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, session_id: Uuid, kind: BootEventKind) -> BootEvent {
        let vec = self.inner.entry(session_id).or_default();
        let seq = vec.len() as u64;
        let ev = BootEvent { seq,
                             session_id,
                             kind,
                             ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, session_id: Uuid) -> Vec<BootEvent> {
        self.inner.get(&session_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_session() {
        let mut store = InMemoryEventStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(store.append_kind(a, BootEventKind::SessionStarted { step_count: 2 }).seq, 0);
        assert_eq!(store.append_kind(a, BootEventKind::TornDown).seq, 1);
        assert_eq!(store.append_kind(b, BootEventKind::TornDown).seq, 0);
        assert_eq!(store.list(a).len(), 2);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
