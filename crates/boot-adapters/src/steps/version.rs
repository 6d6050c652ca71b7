//! VersionStep: alinea la versión instalada con la última publicada.
//!
//! Si la versión remota no se puede obtener se guarda el centinela
//! [`VERSION_UNAVAILABLE`] y el paso se da por bueno: un fallo de red nunca
//! bloquea el arranque.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use boot_core::constants::VERSION_UNAVAILABLE;
use boot_core::{StepDefinition, StepError, StepId, StepOutcome};
use log::{info, warn};

use super::PollSettings;
use crate::http::VersionSource;
use crate::installer::InstallerClient;

/// Última versión conocida, compartida con quien quiera mostrarla.
#[derive(Debug, Clone, Default)]
pub struct LatestVersion(Arc<Mutex<Option<String>>>);

impl LatestVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.lock().map(|v| v.clone()).unwrap_or(None)
    }

    fn set(&self, version: String) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(version);
        }
    }
}

fn normalize(version: &str) -> &str {
    let v = version.trim();
    v.strip_prefix('v').unwrap_or(v)
}

pub(crate) fn versions_match(local: &str, latest: &str) -> bool {
    normalize(local) == normalize(latest)
}

pub struct VersionStep {
    installer: Arc<dyn InstallerClient>,
    source: Arc<dyn VersionSource>,
    latest: LatestVersion,
    poll: PollSettings,
}

impl VersionStep {
    pub fn new(installer: Arc<dyn InstallerClient>,
               source: Arc<dyn VersionSource>,
               latest: LatestVersion,
               poll: PollSettings)
               -> Self {
        Self { installer,
               source,
               latest,
               poll }
    }
}

#[async_trait]
impl StepDefinition for VersionStep {
    fn id(&self) -> StepId {
        StepId::Version
    }

    fn title(&self) -> &str {
        "Check version"
    }

    async fn run(&self) -> Result<StepOutcome, StepError> {
        let latest = match self.source.latest_version().await {
            Ok(v) => v,
            Err(e) => {
                warn!("version:latest-unavailable err={e}");
                VERSION_UNAVAILABLE.to_string()
            }
        };
        self.latest.set(latest.clone());
        if latest == VERSION_UNAVAILABLE {
            return Ok(StepOutcome::Success);
        }

        let local = self.installer.check_local_version().await?;
        if versions_match(&local, &latest) {
            return Ok(StepOutcome::Success);
        }
        info!("version:upgrading local={local} latest={latest}");
        self.installer.install_locally().await?;
        let installer = self.installer.clone();
        Ok(StepOutcome::poll(self.poll.spec(move || {
                                           let installer = installer.clone();
                                           let latest = latest.clone();
                                           async move {
                                               installer.check_local_version()
                                                        .await
                                                        .map(|local| versions_match(&local, &latest))
                                                        .unwrap_or(false)
                                           }
                                       })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_v_and_whitespace_are_ignored() {
        assert!(versions_match("v1.4.2\n", "1.4.2"));
        assert!(versions_match("1.4.2", " v1.4.2"));
        assert!(!versions_match("1.4.1", "1.4.2"));
    }

    #[test]
    fn latest_version_starts_empty() {
        let latest = LatestVersion::new();
        assert_eq!(latest.get(), None);
        latest.set("2.0.0".into());
        assert_eq!(latest.clone().get().as_deref(), Some("2.0.0"));
    }
}
