//! Builder para `BootstrapOrchestrator`.
//!
//! ```ignore
//! let orchestrator = BootstrapOrchestrator::builder(registry)
//!     .endpoint(LocalEndpoint::new("127.0.0.1", 5000))
//!     .on_connected(|c| println!("{}", c.endpoint_url))
//!     .build();
//! ```

use crate::constants::{DEFAULT_LOCAL_HOST, DEFAULT_LOCAL_PORT};
use crate::engine::BootstrapOrchestrator;
use crate::event::{EventStore, InMemoryEventStore};
use crate::finalizer::{Connection, ConnectionFinalizer, LocalEndpoint};
use crate::registry::StepRegistry;

pub struct OrchestratorBuilder {
    registry: StepRegistry,
    endpoint: LocalEndpoint,
    finalizer: Option<ConnectionFinalizer>,
    event_store: Option<Box<dyn EventStore>>,
}

impl OrchestratorBuilder {
    pub(crate) fn new(registry: StepRegistry) -> Self {
        Self { registry,
               endpoint: LocalEndpoint::new(DEFAULT_LOCAL_HOST, DEFAULT_LOCAL_PORT),
               finalizer: None,
               event_store: None }
    }

    #[inline]
    pub fn endpoint(mut self, endpoint: LocalEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Callback que recibe la `Connection` terminal.
    #[inline]
    pub fn on_connected(mut self, f: impl Fn(&Connection) + Send + Sync + 'static) -> Self {
        self.finalizer = Some(ConnectionFinalizer::new(f));
        self
    }

    #[inline]
    pub fn finalizer(mut self, finalizer: ConnectionFinalizer) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    #[inline]
    pub fn event_store(mut self, store: impl EventStore + 'static) -> Self {
        self.event_store = Some(Box::new(store));
        self
    }

    pub fn build(self) -> BootstrapOrchestrator {
        BootstrapOrchestrator::from_parts(self.registry,
                                          self.endpoint,
                                          self.finalizer.unwrap_or_else(ConnectionFinalizer::detached),
                                          self.event_store
                                              .unwrap_or_else(|| Box::new(InMemoryEventStore::default())))
    }
}
