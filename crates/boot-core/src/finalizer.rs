//! Acción terminal: construye el endpoint del servicio local y lo publica.
//!
//! La `Connection` es el único estado que sale del core. Se entrega al
//! llamador por el callback `on_connected`; no existe un punto global de
//! publicación.

use serde::{Deserialize, Serialize};

use crate::constants::ENDPOINT_SCHEME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub endpoint_url: String,
}

/// Host y puerto fijos del servicio local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEndpoint {
    pub host: String,
    pub port: u16,
}

impl LocalEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    /// URL base del servicio, la misma que publica el finalizador.
    pub fn url(&self) -> String {
        endpoint_url(&self.host, self.port)
    }
}

pub type OnConnected = Box<dyn Fn(&Connection) + Send + Sync>;

pub struct ConnectionFinalizer {
    on_connected: OnConnected,
}

impl ConnectionFinalizer {
    pub fn new(on_connected: impl Fn(&Connection) + Send + Sync + 'static) -> Self {
        Self { on_connected: Box::new(on_connected) }
    }

    /// Finalizador que no publica a nadie.
    pub fn detached() -> Self {
        Self::new(|_| {})
    }

    /// Construye la conexión y la publica. No falla.
    pub fn finalize(&self, host: &str, port: u16) -> Connection {
        let connection = Connection { endpoint_url: endpoint_url(host, port) };
        (self.on_connected)(&connection);
        connection
    }
}

impl std::fmt::Debug for ConnectionFinalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConnectionFinalizer")
    }
}

fn endpoint_url(host: &str, port: u16) -> String {
    // IPv6 literal
    if host.contains(':') && !host.starts_with('[') {
        format!("{ENDPOINT_SCHEME}://[{host}]:{port}")
    } else {
        format!("{ENDPOINT_SCHEME}://{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn finalize_publishes_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let finalizer = ConnectionFinalizer::new(move |c| sink.lock().unwrap().push(c.clone()));
        let conn = finalizer.finalize("127.0.0.1", 5000);
        assert_eq!(conn.endpoint_url, "http://127.0.0.1:5000");
        assert_eq!(*seen.lock().unwrap(), vec![conn]);
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        assert_eq!(endpoint_url("::1", 8080), "http://[::1]:8080");
        assert_eq!(endpoint_url("localhost", 80), "http://localhost:80");
        assert_eq!(LocalEndpoint::new("::1", 5000).url(), "http://[::1]:5000");
    }
}
