use async_trait::async_trait;
use reqwest::Client;

use super::http;
use super::traits::MappingStore;
use crate::errors::CoreError;
use crate::models::mapping::PnMappingTable;

const MAPPINGS_PATH: &str = "/api/pn-mappings";

/// Mapping backend reachable over HTTP.
///
/// - `GET  {base}/api/pn-mappings` → structured or legacy flat JSON
/// - `PUT  {base}/api/pn-mappings` ← full table as `{exact, patterns}`
pub struct HttpMappingStore {
    client: Client,
    base_url: String,
}

impl HttpMappingStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: http::default_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = http::build_client(timeout_secs);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{MAPPINGS_PATH}", self.base_url)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MappingStore for HttpMappingStore {
    fn name(&self) -> &str {
        "pn-mappings"
    }

    async fn fetch(&self) -> Result<PnMappingTable, CoreError> {
        let resp = self.client.get(self.endpoint()).send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: self.name().into(),
                message: format!("HTTP {} while fetching mappings", resp.status()),
            });
        }
        resp.json().await.map_err(|e| CoreError::Api {
            provider: self.name().into(),
            message: format!("Failed to parse mapping table: {e}"),
        })
    }

    async fn push(&self, table: &PnMappingTable) -> Result<(), CoreError> {
        let resp = self.client.put(self.endpoint()).json(table).send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: self.name().into(),
                message: format!("HTTP {} while pushing mappings", resp.status()),
            });
        }
        Ok(())
    }
}
