use crate::config::Config;
use crate::errors::AppError;
use crate::lookup::DataClient;
use crate::models::LookupRecord;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// JSON envelope returned by `GET /api/cliente/{root}`.
///
/// Carries a success indicator and, on failure, an `erro` message; the record
/// fields live at the top level next to the flag.
#[derive(Debug, Deserialize)]
pub struct RecordEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub erro: Option<String>,
    #[serde(flatten)]
    pub record: LookupRecord,
}

/// JSON envelope returned by `GET /api/sincronizar/{root}` on failure.
#[derive(Debug, Deserialize)]
pub struct SyncEnvelope {
    #[serde(default)]
    pub mensagem: Option<String>,
}

/// Client for the CISP portal backend.
pub struct CispService {
    client: Client,
    base_url: String,
}

impl CispService {
    /// Creates a new `CispService` from the application configuration.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch the cached record for a root.
    ///
    /// Fails on a non-success status, a malformed payload, or an envelope
    /// whose own success indicator is false. The failure message comes from
    /// the payload `erro` field when present.
    pub async fn fetch_record(&self, root: &str) -> Result<LookupRecord, AppError> {
        let url = format!("{}/api/cliente/{}", self.base_url, root);
        tracing::info!("Fetching cached record for root {}", root);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Record fetch failed: {}", e)))?;

        let status = response.status();
        let envelope: RecordEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to parse record payload: {}", e)))?;

        if !status.is_success() || !envelope.success {
            let msg = envelope
                .erro
                .unwrap_or_else(|| "Failed to fetch cached record".to_string());
            tracing::warn!("Record fetch for root {} rejected ({}): {}", root, status, msg);
            return Err(AppError::Fetch(msg));
        }

        tracing::info!("Fetched cached record for root {}", root);
        Ok(envelope.record)
    }

    /// Ask the backend to refresh its cached record for a root from the
    /// upstream source. Completion of this call means the refresh finished;
    /// the caller re-fetches afterwards.
    pub async fn trigger_sync(&self, root: &str) -> Result<(), AppError> {
        let url = format!("{}/api/sincronizar/{}", self.base_url, root);
        tracing::info!("Triggering upstream synchronization for root {}", root);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Sync(format!("Sync request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let msg = response
                .json::<SyncEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.mensagem)
                .unwrap_or_else(|| "Failed to synchronize record".to_string());
            tracing::warn!("Sync for root {} rejected ({}): {}", root, status, msg);
            return Err(AppError::Sync(msg));
        }

        tracing::info!("Upstream synchronization finished for root {}", root);
        Ok(())
    }

    /// Passive health probe. Any non-success response or network failure is
    /// reported as unhealthy.
    pub async fn health(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Health probe failed: {}", e);
                false
            }
        }
    }
}

impl DataClient for CispService {
    async fn fetch_record(&self, root: &str) -> Result<LookupRecord, AppError> {
        CispService::fetch_record(self, root).await
    }

    async fn trigger_sync(&self, root: &str) -> Result<(), AppError> {
        CispService::trigger_sync(self, root).await
    }
}
