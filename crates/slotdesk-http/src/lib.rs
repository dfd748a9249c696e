//! HTTP gateway to the admissions service
//!
//! Binds the `SlotGateway` operations to the service's REST endpoints:
//! - `GET  /api/programs`
//! - `GET  /api/school-years`
//! - `GET  /api/programs/availability/{yearId}`
//! - `POST /api/program-slots`
//! - `GET  /api/page_access/{employeeId}/{pageId}`
//!
//! Each call is a single request. Nothing is retried or cached.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use slotdesk_core::{
    GatewayError, PageAccess, Program, SchoolYear, SlotDeskConfig, SlotGateway, SlotLimit,
    SlotSummaryRow, YearId,
};
use std::time::Duration;
use tracing::instrument;

/// Error body shape used by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `SlotGateway` over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    /// Create gateway for a service base URL
    ///
    /// # Errors
    /// - `GatewayError::InvalidBaseUrl` if the URL does not parse or cannot
    ///   take path segments
    /// - `GatewayError::Transport` if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| GatewayError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("client setup failed: {e}")))?;

        Ok(Self { client, base })
    }

    /// Create gateway from configuration
    ///
    /// # Errors
    /// - Same as [`HttpGateway::new`]
    pub fn from_config(config: &SlotDeskConfig) -> Result<Self, GatewayError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Service base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/api/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, GatewayError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await.map_err(transport)?;
        decode(check(response).await?).await
    }
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(e.to_string())
}

/// Turn non-success responses into `GatewayError::Status`
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());

    tracing::warn!(status = status.as_u16(), %message, "service returned an error");
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let body = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[async_trait]
impl SlotGateway for HttpGateway {
    #[instrument(level = "debug", skip(self), err)]
    async fn list_programs(&self) -> Result<Vec<Program>, GatewayError> {
        self.get_json(&["programs"]).await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn list_school_years(&self) -> Result<Vec<SchoolYear>, GatewayError> {
        self.get_json(&["school-years"]).await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn slot_summary(&self, year_id: YearId) -> Result<Vec<SlotSummaryRow>, GatewayError> {
        let year = year_id.to_string();
        self.get_json(&["programs", "availability", &year]).await
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn upsert_slot_limit(&self, limit: SlotLimit) -> Result<(), GatewayError> {
        let url = self.endpoint(&["program-slots"])?;
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(&limit)
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn page_access(
        &self,
        employee_id: &str,
        page_id: u32,
    ) -> Result<PageAccess, GatewayError> {
        let page = page_id.to_string();
        self.get_json(&["page_access", employee_id, &page]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for bad in ["not a url", "mailto:registrar@school.edu", "ftp://files.example.edu"] {
            let err = HttpGateway::new(bad, Duration::from_secs(5)).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidBaseUrl(_)), "{bad}");
        }
    }

    #[test]
    fn endpoints_append_api_prefix() {
        let g = gateway("http://localhost:5000");
        assert_eq!(
            g.endpoint(&["programs", "availability", "3"]).unwrap().as_str(),
            "http://localhost:5000/api/programs/availability/3"
        );

        let nested = gateway("https://portal.example.edu/admissions/");
        assert_eq!(
            nested.endpoint(&["school-years"]).unwrap().as_str(),
            "https://portal.example.edu/admissions/api/school-years"
        );
    }

    #[test]
    fn endpoint_segments_are_encoded() {
        let g = gateway("http://localhost:5000");
        assert_eq!(
            g.endpoint(&["page_access", "EMP 7/2", "110"]).unwrap().as_str(),
            "http://localhost:5000/api/page_access/EMP%207%2F2/110"
        );
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = SlotDeskConfig::new().with_base_url("http://10.1.2.3:8080");
        let g = HttpGateway::from_config(&config).unwrap();
        assert_eq!(g.base_url().as_str(), "http://10.1.2.3:8080/");
    }
}
