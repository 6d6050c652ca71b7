//! localboot
//!
//! Librería del binario de arranque local:
//! - `config`: parámetros del arranque leídos de variables de entorno (.env).
//! - `errors`: errores de configuración y de sesión.
//! - `session`: cableado de adapters, registro y orquestador.
//!
//! El orquestador y los pasos viven en `boot-core` y `boot-adapters`.

pub mod config;
pub mod errors;
pub mod session;

pub use config::BootConfig;
pub use errors::AppError;
