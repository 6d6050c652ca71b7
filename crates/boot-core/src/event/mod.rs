//! Registro de eventos del arranque y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{BootEvent, BootEventKind};
