//! Configuración del arranque local.
//! Carga `.env` una sola vez y lee las variables `LOCALBOOT_*`. Los valores
//! numéricos inválidos no abortan: se avisa y se usa el valor por defecto.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use boot_adapters::{InstallerCommands, PollSettings};
use boot_core::constants::{DEFAULT_LOCAL_HOST, DEFAULT_LOCAL_PORT, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_MAX_ATTEMPTS};
use boot_core::LocalEndpoint;
use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;

/// Prefijo de la tabla de comandos del instalador (`LOCALBOOT_CMD_<OP>`).
pub const COMMAND_PREFIX: &str = "LOCALBOOT_CMD_";

const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_millis(2000);
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct BootConfig {
    pub host: String,
    pub port: u16,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub health_interval: Duration,
    /// Timeout de cada petición HTTP de los adapters.
    pub http_timeout: Duration,
    /// `None`: la versión remota se da por no disponible.
    pub version_url: Option<String>,
    pub plugin_platform: String,
    pub commands: InstallerCommands,
}

impl BootConfig {
    pub fn from_env() -> Self {
        init_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero leyendo de `lookup`; no toca el proceso.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let host = text("LOCALBOOT_HOST").unwrap_or_else(|| DEFAULT_LOCAL_HOST.to_string());
        let port = parse_or(&lookup, "LOCALBOOT_PORT", DEFAULT_LOCAL_PORT);
        let poll_interval = millis_or(&lookup, "LOCALBOOT_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL);
        let poll_max_attempts = parse_or(&lookup, "LOCALBOOT_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS);
        let health_interval = millis_or(&lookup, "LOCALBOOT_HEALTH_INTERVAL_MS", DEFAULT_HEALTH_INTERVAL);
        let http_timeout = millis_or(&lookup, "LOCALBOOT_HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT);
        let version_url = text("LOCALBOOT_VERSION_URL");
        let plugin_platform = text("LOCALBOOT_PLUGIN_PLATFORM").unwrap_or_else(|| env::consts::OS.to_string());
        let commands = InstallerCommands::from_lookup(COMMAND_PREFIX, &lookup);
        Self { host,
               port,
               poll_interval,
               poll_max_attempts,
               health_interval,
               http_timeout,
               version_url,
               plugin_platform,
               commands }
    }

    pub fn endpoint(&self) -> LocalEndpoint {
        LocalEndpoint::new(self.host.clone(), self.port)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::new(self.poll_interval, self.poll_max_attempts)
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
    where T: FromStr + Copy,
          F: Fn(&str) -> Option<String>
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                warn!("config:invalid key={key} value={raw:?} using default");
                default
            }
        },
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Duration
    where F: Fn(&str) -> Option<String>
{
    let ms = parse_or(lookup, key, default.as_millis() as u64);
    if ms == 0 {
        warn!("config:invalid key={key} value=0 using default");
        return default;
    }
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_adapters::InstallerOp;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = BootConfig::from_lookup(|_| None);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.poll_settings(), PollSettings::default());
        assert_eq!(cfg.health_interval, Duration::from_millis(2000));
        assert_eq!(cfg.version_url, None);
        assert_eq!(cfg.plugin_platform, env::consts::OS);
        assert!(cfg.commands.is_empty());
        assert_eq!(cfg.endpoint().url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn reads_overrides_and_command_table() {
        let cfg = BootConfig::from_lookup(lookup_from(&[("LOCALBOOT_HOST", "localhost"),
                                                        ("LOCALBOOT_PORT", "5055"),
                                                        ("LOCALBOOT_POLL_INTERVAL_MS", "500"),
                                                        ("LOCALBOOT_POLL_MAX_ATTEMPTS", "3"),
                                                        ("LOCALBOOT_VERSION_URL", "https://example.test/latest"),
                                                        ("LOCALBOOT_PLUGIN_PLATFORM", "darwin"),
                                                        ("LOCALBOOT_CMD_START_LOCAL_SERVER", "backend serve")]));
        assert_eq!(cfg.endpoint(), LocalEndpoint::new("localhost", 5055));
        assert_eq!(cfg.poll_settings(), PollSettings::new(Duration::from_millis(500), 3));
        assert_eq!(cfg.version_url.as_deref(), Some("https://example.test/latest"));
        assert_eq!(cfg.plugin_platform, "darwin");
        assert_eq!(cfg.commands.get(InstallerOp::StartLocalServer), Some("backend serve"));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let cfg = BootConfig::from_lookup(lookup_from(&[("LOCALBOOT_PORT", "99999"),
                                                        ("LOCALBOOT_POLL_INTERVAL_MS", "0"),
                                                        ("LOCALBOOT_POLL_MAX_ATTEMPTS", "many")]));
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.poll_settings(), PollSettings::default());
    }
}
