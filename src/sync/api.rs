//! # Sync API Client
//!
//! HTTP client for the two server endpoints this crate consumes: the
//! payment replay endpoint and the client snapshot download. Any 2xx
//! response counts as success; any other status or transport error is a
//! delivery failure the reconciler will retry.

use reqwest::Client;

use crate::config::Config;
use crate::error::SyncError;
use crate::model::{ClientSnapshot, PaymentPayload};

/// Path the payment payload is POSTed to
const PAYMENTS_PATH: &str = "/api/payments";

/// Path the client snapshot is downloaded from
const CLIENTS_PATH: &str = "/api/clients";

/// Client for the server sync endpoints.
#[derive(Debug, Clone)]
pub struct SyncApi {
    config: Config,
    client: Client,
}

impl SyncApi {
    /// Build a client with the configured fixed request timeout.
    pub fn new(config: Config) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SyncError::delivery(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Replay one payment capture server-side.
    pub async fn push_payment(&self, payload: &PaymentPayload) -> Result<(), SyncError> {
        let url = self.config.api_url(PAYMENTS_PATH);

        let mut request = self.client.post(&url).json(payload);
        if let Some(token) = self.config.api_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::delivery(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(SyncError::delivery(format!(
                "server rejected payment: {} - {}",
                status, body
            )));
        }

        Ok(())
    }

    /// Download the full client snapshot.
    pub async fn fetch_clients(&self) -> Result<Vec<ClientSnapshot>, SyncError> {
        let url = self.config.api_url(CLIENTS_PATH);

        let mut request = self.client.get(&url);
        if let Some(token) = self.config.api_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::delivery(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::delivery(format!(
                "snapshot download failed: {}",
                status
            )));
        }

        response
            .json::<Vec<ClientSnapshot>>()
            .await
            .map_err(|e| SyncError::delivery(format!("invalid snapshot body: {}", e)))
    }
}
