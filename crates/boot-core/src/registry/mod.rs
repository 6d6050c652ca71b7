//! Catálogo ordenado e inmutable de pasos.
//!
//! El registro se construye una sola vez mediante `RegistryBuilder` y luego
//! sólo se consulta. Los ordinales son posicionales (`0..len`) y siguen el
//! orden canónico de `StepId`; un registro puede contener un subconjunto de
//! los pasos conocidos. La última entrada es el paso terminal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::RegistryError;
use crate::step::{StepDefinition, StepId};

pub struct StepRegistry {
    steps: Vec<Arc<dyn StepDefinition>>,
    index: HashMap<StepId, usize>,
}

impl StepRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder { steps: Vec::new() }
    }

    /// Construye el registro a partir de una lista ya ordenada.
    pub fn from_steps(steps: Vec<Arc<dyn StepDefinition>>) -> Result<Self, RegistryError> {
        if steps.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut index = HashMap::with_capacity(steps.len());
        let mut last: Option<StepId> = None;
        for (ordinal, step) in steps.iter().enumerate() {
            let id = step.id();
            if index.insert(id, ordinal).is_some() {
                return Err(RegistryError::Duplicate(id));
            }
            if let Some(prev) = last {
                if id < prev {
                    return Err(RegistryError::OutOfOrder(id));
                }
            }
            last = Some(id);
        }
        Ok(Self { steps, index })
    }

    pub fn get(&self, ordinal: usize) -> Option<&Arc<dyn StepDefinition>> {
        self.steps.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Ordinal del paso con ese id, `None` si no está registrado.
    pub fn index_of(&self, id: StepId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn id_at(&self, ordinal: usize) -> Option<StepId> {
        self.steps.get(ordinal).map(|s| s.id())
    }

    pub fn is_terminal(&self, ordinal: usize) -> bool {
        ordinal + 1 == self.steps.len()
    }

    pub fn ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id()).collect()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry").field("steps", &self.ids()).finish()
    }
}

/// Builder del registro: acumula pasos y valida al construir.
#[derive(Default)]
pub struct RegistryBuilder {
    steps: Vec<Arc<dyn StepDefinition>>,
}

impl RegistryBuilder {
    #[inline]
    pub fn step<S>(mut self, step: S) -> Self
        where S: StepDefinition + 'static
    {
        self.steps.push(Arc::new(step));
        self
    }

    #[inline]
    pub fn boxed(mut self, step: Arc<dyn StepDefinition>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<StepRegistry, RegistryError> {
        StepRegistry::from_steps(self.steps)
    }
}
