//! Watcher de salud del servicio local (colaborador externo).
//!
//! El paso que arranca el servicio no se sondea a sí mismo: dispara el
//! arranque una vez y espera a que un watcher independiente publique
//! `reachable = true`. La suscripción es un `watch::Receiver`; soltarlo
//! equivale a desuscribirse.

use tokio::sync::watch;

pub trait HealthWatcher: Send + Sync {
    /// Nueva suscripción al valor de alcanzabilidad.
    fn subscribe(&self) -> watch::Receiver<bool>;

    /// Último valor publicado.
    fn is_reachable(&self) -> bool {
        *self.subscribe().borrow()
    }
}

/// Watcher alimentado a mano. Base de los watchers reales y de los tests.
#[derive(Debug)]
pub struct ChannelHealthWatcher {
    tx: watch::Sender<bool>,
}

impl ChannelHealthWatcher {
    pub fn new(initial: bool) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Publica un nuevo valor; sólo notifica si cambia.
    pub fn set_reachable(&self, reachable: bool) {
        self.tx.send_if_modified(|current| {
                   if *current == reachable {
                       false
                   } else {
                       *current = reachable;
                       true
                   }
               });
    }
}

impl Default for ChannelHealthWatcher {
    fn default() -> Self {
        Self::new(false)
    }
}

impl HealthWatcher for ChannelHealthWatcher {
    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_changes() {
        let watcher = ChannelHealthWatcher::default();
        let mut rx = watcher.subscribe();
        assert!(!watcher.is_reachable());
        watcher.set_reachable(true);
        rx.changed().await.expect("sender alive");
        assert!(*rx.borrow());
        assert!(watcher.is_reachable());
    }
}
