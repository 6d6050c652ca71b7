//! Colaboradores HTTP: versión remota, plugins y salud del servicio local.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AdapterError;

const USER_AGENT: &str = concat!("localboot/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout: Duration) -> Result<Client, AdapterError> {
    Ok(Client::builder().timeout(timeout).user_agent(USER_AGENT).build()?)
}

/// Fuente de la última versión publicada.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn latest_version(&self) -> Result<String, AdapterError>;
}

#[derive(Debug, Deserialize)]
struct ReleaseTag {
    tag_name: String,
}

/// `GET <url>` devolviendo `{ "tag_name": "..." }`.
#[derive(Debug, Clone)]
pub struct HttpVersionSource {
    client: Client,
    url: String,
}

impl HttpVersionSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AdapterError> {
        Ok(Self { client: build_client(timeout)?,
                  url: url.into() })
    }
}

#[async_trait]
impl VersionSource for HttpVersionSource {
    async fn latest_version(&self) -> Result<String, AdapterError> {
        debug!("version:fetch url={}", self.url);
        let tag: ReleaseTag = self.client
                                  .get(&self.url)
                                  .header(header::ACCEPT, "application/json")
                                  .send()
                                  .await?
                                  .error_for_status()?
                                  .json()
                                  .await?;
        Ok(tag.tag_name)
    }
}

/// Sin URL configurada: siempre falla, y el paso de versión degrada al
/// centinela.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredVersionSource;

#[async_trait]
impl VersionSource for UnconfiguredVersionSource {
    async fn latest_version(&self) -> Result<String, AdapterError> {
        Err(AdapterError::NotConfigured("version_url".into()))
    }
}

/// Plugins que faltan para la plataforma actual. Una lista vacía indica que
/// no queda nada por instalar.
#[async_trait]
pub trait PluginClient: Send + Sync {
    async fn list_missing(&self, platform: &str) -> Result<Vec<Value>, AdapterError>;
    /// Instala los que falten y devuelve los que siguen pendientes.
    async fn install_missing(&self, platform: &str) -> Result<Vec<Value>, AdapterError>;
}

#[derive(Debug, Clone)]
pub struct HttpPluginClient {
    client: Client,
    base_url: String,
}

impl HttpPluginClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AdapterError> {
        Ok(Self { client: build_client(timeout)?,
                  base_url: base_url.into().trim_end_matches('/').to_string() })
    }

    pub fn missing_url(&self) -> String {
        format!("{}/plugins/missing", self.base_url)
    }

    pub fn install_url(&self) -> String {
        format!("{}/plugins/install", self.base_url)
    }

    async fn get_list(&self, url: String, platform: &str) -> Result<Vec<Value>, AdapterError> {
        debug!("plugins:get url={url} platform={platform}");
        let list = self.client
                       .get(url)
                       .query(&[("platform", platform)])
                       .send()
                       .await?
                       .error_for_status()?
                       .json::<Vec<Value>>()
                       .await?;
        Ok(list)
    }
}

#[async_trait]
impl PluginClient for HttpPluginClient {
    async fn list_missing(&self, platform: &str) -> Result<Vec<Value>, AdapterError> {
        self.get_list(self.missing_url(), platform).await
    }

    async fn install_missing(&self, platform: &str) -> Result<Vec<Value>, AdapterError> {
        self.get_list(self.install_url(), platform).await
    }
}

/// Sonda puntual de salud del servicio local.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> bool;
}

/// `GET http://host:port/health`; cualquier respuesta 2xx cuenta como viva.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(endpoint_url: &str, timeout: Duration) -> Result<Self, AdapterError> {
        Ok(Self { client: build_client(timeout)?,
                  url: format!("{}/health", endpoint_url.trim_end_matches('/')) })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("health:unreachable url={} err={e}", self.url);
                false
            }
        }
    }
}
