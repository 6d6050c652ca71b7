//! SystemRequirementsStep: bloquea antes de cualquier instalación si el
//! sistema no cumple los requisitos. El motivo se muestra tal cual.

use std::sync::Arc;

use async_trait::async_trait;
use boot_core::{StepDefinition, StepError, StepId, StepOutcome};

use crate::installer::InstallerClient;

pub struct SystemRequirementsStep {
    installer: Arc<dyn InstallerClient>,
}

impl SystemRequirementsStep {
    pub fn new(installer: Arc<dyn InstallerClient>) -> Self {
        Self { installer }
    }
}

#[async_trait]
impl StepDefinition for SystemRequirementsStep {
    fn id(&self) -> StepId {
        StepId::SystemRequirements
    }

    fn title(&self) -> &str {
        "Check system requirements"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        match self.installer.check_system_requirements().await? {
            Some(issue) => Err(StepError::Prerequisite(issue)),
            None => Ok(StepOutcome::Success),
        }
    }
}
