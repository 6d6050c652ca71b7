//! PluginsStep: instala los plugins que falten para la plataforma actual.

use std::sync::Arc;

use async_trait::async_trait;
use boot_core::{StepDefinition, StepError, StepId, StepOutcome};
use log::info;

use super::PollSettings;
use crate::http::PluginClient;

pub struct PluginsStep {
    client: Arc<dyn PluginClient>,
    platform: String,
    poll: PollSettings,
}

impl PluginsStep {
    pub fn new(client: Arc<dyn PluginClient>, platform: impl Into<String>, poll: PollSettings) -> Self {
        Self { client,
               platform: platform.into(),
               poll }
    }
}

#[async_trait]
impl StepDefinition for PluginsStep {
    fn id(&self) -> StepId {
        StepId::Plugins
    }

    fn title(&self) -> &str {
        "Install plugins"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        let missing = self.client.list_missing(&self.platform).await?;
        if missing.is_empty() {
            return Ok(StepOutcome::Success);
        }
        info!("plugins:installing platform={} count={}", self.platform, missing.len());
        let pending = self.client.install_missing(&self.platform).await?;
        if pending.is_empty() {
            return Ok(StepOutcome::Success);
        }
        let client = self.client.clone();
        let platform = self.platform.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let client = client.clone();
                                           let platform = platform.clone();
                                           async move {
                                               client.list_missing(&platform)
                                                     .await
                                                     .map(|m| m.is_empty())
                                                     .unwrap_or(false)
                                           }
                                       })))
    }
}
