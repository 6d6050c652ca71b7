#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use boot_adapters::{AdapterError, BootstrapContext, InstallerClient, LatestVersion, PluginClient, PollSettings,
                    StatusReport, VersionSource};
use boot_core::ChannelHealthWatcher;
use serde_json::Value;

/// Instalador en memoria. Las acciones de instalación sólo surten efecto si
/// `actions_take_effect` está activo; así se simulan instalaciones que nunca
/// convergen.
pub struct FakeInstaller {
    pub requirements_issue: Mutex<Option<String>>,
    pub installed: AtomicBool,
    pub local_version: Mutex<String>,
    pub target_version: Mutex<String>,
    pub runtime_manager: AtomicBool,
    /// Respuestas guionizadas de `check_if_environment_exists`; al agotarse
    /// se usa `environment_exists`.
    pub environment_replies: Mutex<VecDeque<bool>>,
    pub environment_exists: AtomicBool,
    pub dependencies_ok: AtomicBool,
    /// Mientras falten dependencias, responder `success` con la lista de
    /// pendientes en `data` en lugar de `error`.
    pub dependencies_listed_as_success: AtomicBool,
    pub server_report: Mutex<StatusReport>,
    /// Watcher que se pone a `true` tras el retardo indicado al arrancar.
    pub server_comes_up: Mutex<Option<(Arc<ChannelHealthWatcher>, Duration)>>,
    pub actions_take_effect: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeInstaller {
    /// Nada instalado; las acciones convergen.
    pub fn blank() -> Self {
        Self { requirements_issue: Mutex::new(None),
               installed: AtomicBool::new(false),
               local_version: Mutex::new(String::new()),
               target_version: Mutex::new("2.0.0".into()),
               runtime_manager: AtomicBool::new(false),
               environment_replies: Mutex::new(VecDeque::new()),
               environment_exists: AtomicBool::new(false),
               dependencies_ok: AtomicBool::new(false),
               dependencies_listed_as_success: AtomicBool::new(false),
               server_report: Mutex::new(StatusReport::success()),
               server_comes_up: Mutex::new(None),
               actions_take_effect: AtomicBool::new(true),
               calls: Mutex::new(Vec::new()) }
    }

    /// Todo instalado y al día.
    pub fn ready() -> Self {
        let fake = Self::blank();
        fake.installed.store(true, Ordering::SeqCst);
        *fake.local_version.lock().unwrap() = "2.0.0".into();
        fake.runtime_manager.store(true, Ordering::SeqCst);
        fake.environment_exists.store(true, Ordering::SeqCst);
        fake.dependencies_ok.store(true, Ordering::SeqCst);
        fake
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn note(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }

    fn effective(&self) -> bool {
        self.actions_take_effect.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstallerClient for FakeInstaller {
    async fn check_system_requirements(&self) -> Result<Option<String>, AdapterError> {
        self.note("check_system_requirements");
        Ok(self.requirements_issue.lock().unwrap().clone())
    }

    async fn check_if_installed_locally(&self) -> Result<bool, AdapterError> {
        self.note("check_if_installed_locally");
        Ok(self.installed.load(Ordering::SeqCst))
    }

    async fn check_local_version(&self) -> Result<String, AdapterError> {
        self.note("check_local_version");
        Ok(self.local_version.lock().unwrap().clone())
    }

    async fn install_locally(&self) -> Result<(), AdapterError> {
        self.note("install_locally");
        if self.effective() {
            self.installed.store(true, Ordering::SeqCst);
            let target = self.target_version.lock().unwrap().clone();
            *self.local_version.lock().unwrap() = target;
        }
        Ok(())
    }

    async fn check_if_runtime_manager_exists(&self) -> Result<bool, AdapterError> {
        self.note("check_if_runtime_manager_exists");
        Ok(self.runtime_manager.load(Ordering::SeqCst))
    }

    async fn install_runtime_manager(&self) -> Result<(), AdapterError> {
        self.note("install_runtime_manager");
        if self.effective() {
            self.runtime_manager.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn check_if_environment_exists(&self) -> Result<StatusReport, AdapterError> {
        self.note("check_if_environment_exists");
        let exists = self.environment_replies
                         .lock()
                         .unwrap()
                         .pop_front()
                         .unwrap_or_else(|| self.environment_exists.load(Ordering::SeqCst));
        Ok(if exists {
               StatusReport::success()
           } else {
               StatusReport::error("environment not found")
           })
    }

    async fn create_environment(&self) -> Result<(), AdapterError> {
        self.note("create_environment");
        if self.effective() {
            self.environment_exists.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn check_dependencies(&self) -> Result<StatusReport, AdapterError> {
        self.note("check_dependencies");
        Ok(if self.dependencies_ok.load(Ordering::SeqCst) {
               StatusReport::success()
           } else if self.dependencies_listed_as_success.load(Ordering::SeqCst) {
               StatusReport::success().with_data(serde_json::json!(["numpy"]))
           } else {
               StatusReport::error("missing packages").with_data(serde_json::json!(["numpy"]))
           })
    }

    async fn install_dependencies(&self) -> Result<(), AdapterError> {
        self.note("install_dependencies");
        if self.effective() {
            self.dependencies_ok.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn start_local_server(&self) -> Result<StatusReport, AdapterError> {
        self.note("start_local_server");
        if let Some((watcher, delay)) = self.server_comes_up.lock().unwrap().clone() {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                watcher.set_reachable(true);
            });
        }
        Ok(self.server_report.lock().unwrap().clone())
    }
}

/// Fuente de versión fija o caída.
pub struct FakeVersions(pub Option<String>);

#[async_trait]
impl VersionSource for FakeVersions {
    async fn latest_version(&self) -> Result<String, AdapterError> {
        self.0
            .clone()
            .ok_or_else(|| AdapterError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "release feed down")))
    }
}

/// Plugins pendientes; `install_missing` los vacía.
#[derive(Default)]
pub struct FakePlugins {
    pub missing: Mutex<Vec<Value>>,
    pub installs: Mutex<u32>,
}

#[async_trait]
impl PluginClient for FakePlugins {
    async fn list_missing(&self, _platform: &str) -> Result<Vec<Value>, AdapterError> {
        Ok(self.missing.lock().unwrap().clone())
    }

    async fn install_missing(&self, _platform: &str) -> Result<Vec<Value>, AdapterError> {
        *self.installs.lock().unwrap() += 1;
        self.missing.lock().unwrap().clear();
        Ok(Vec::new())
    }
}

pub struct Harness {
    pub installer: Arc<FakeInstaller>,
    pub plugins: Arc<FakePlugins>,
    pub health: Arc<ChannelHealthWatcher>,
    pub ctx: BootstrapContext,
}

pub fn harness(installer: FakeInstaller, latest: Option<&str>) -> Harness {
    let installer = Arc::new(installer);
    let plugins = Arc::new(FakePlugins::default());
    let health = Arc::new(ChannelHealthWatcher::default());
    let ctx = BootstrapContext { installer: installer.clone(),
                                 versions: Arc::new(FakeVersions(latest.map(str::to_string))),
                                 plugins: plugins.clone(),
                                 health: health.clone(),
                                 poll: PollSettings::default(),
                                 platform: "linux".into(),
                                 latest_version: LatestVersion::new() };
    Harness { installer,
              plugins,
              health,
              ctx }
}

/// Compara tiempos virtuales con tolerancia de granularidad del timer.
pub fn assert_elapsed_about(actual: Duration, expected: Duration) {
    let slack = Duration::from_millis(5);
    assert!(actual + slack >= expected && actual <= expected + slack,
            "elapsed {actual:?}, expected about {expected:?}");
}
