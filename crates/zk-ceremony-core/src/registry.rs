//! Coordinator backend client.

use async_trait::async_trait;

use crate::ceremony::{CeremonyRegistration, RegistrationReceipt};
use crate::error::{CeremonyError, Result};

/// The single registration call that commits an assembled ceremony.
#[async_trait]
pub trait CeremonyRegistry: Send + Sync {
    /// Submit the whole ceremony as one atomic request and await the
    /// backend's acknowledgement.
    async fn register(&self, registration: &CeremonyRegistration) -> Result<RegistrationReceipt>;
}

/// Posts registrations as JSON to the coordinator's HTTP API.
pub struct HttpRegistry {
    client: reqwest::Client,
    api_base_url: String,
    token: Option<String>,
}

impl HttpRegistry {
    pub fn new(api_base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
            token,
        }
    }
}

#[async_trait]
impl CeremonyRegistry for HttpRegistry {
    async fn register(&self, registration: &CeremonyRegistration) -> Result<RegistrationReceipt> {
        let url = format!("{}/ceremonies", self.api_base_url.trim_end_matches('/'));
        tracing::info!(
            "registering ceremony '{}' with {} circuits",
            registration.prefix,
            registration.circuits.len()
        );

        let mut request = self.client.post(&url).json(registration);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CeremonyError::Registration(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CeremonyError::Registration(format!(
                "coordinator returned HTTP {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CeremonyError::Registration(format!("invalid acknowledgement: {e}")))
    }
}
