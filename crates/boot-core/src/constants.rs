//! Constantes del orquestador de arranque.
//!
//! Todos los pasos que confirman por sondeo usan el mismo par
//! intervalo/intentos; se centralizan aquí para que los adapters y la
//! configuración partan de los mismos valores por defecto.

use std::time::Duration;

/// Intervalo fijo entre comprobaciones de un sondeo acotado.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Número máximo de comprobaciones antes de dar el paso por agotado.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 8;

/// Mensaje genérico cuando un sondeo (o la espera del watcher) se agota.
/// La comprobación sólo devuelve un booleano, así que no hay causa concreta.
pub const STEP_NOT_SUCCESSFUL: &str = "Step was not successful";

/// Valor centinela que sustituye a la versión remota cuando la consulta de
/// red falla.
pub const VERSION_UNAVAILABLE: &str = "unavailable";

/// Esquema usado al construir el endpoint del servicio local.
pub const ENDPOINT_SCHEME: &str = "http";

/// Host por defecto del servicio local.
pub const DEFAULT_LOCAL_HOST: &str = "127.0.0.1";

/// Puerto fijo por defecto del servicio local.
pub const DEFAULT_LOCAL_PORT: u16 = 5000;
