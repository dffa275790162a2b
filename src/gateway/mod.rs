//! Submission of rendered requests to the AEAT SOAP endpoint.
//!
//! The caller supplies a `reqwest::Client` already configured with the
//! taxpayer's client certificate; this module only posts documents and
//! interprets answers. There are no retries: errors for which
//! [`VerifactuError::is_retryable`] holds may be retried by the caller.

use std::time::Duration;

use crate::core::*;
use crate::xml;

/// Default request timeout for [`GatewayClient::with_defaults`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts `RegFactuSistemaFacturacion` envelopes to one endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GatewayClient {
    /// Use `http` against the endpoint of `env`.
    pub fn new(http: reqwest::Client, env: Environment) -> Self {
        Self {
            http,
            endpoint: env.gateway_endpoint().to_string(),
        }
    }

    /// A plain client without certificate, mainly for tests and proxies.
    pub fn with_defaults(env: Environment) -> Result<Self, VerifactuError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| VerifactuError::Connection(e.to_string()))?;
        Ok(Self::new(http, env))
    }

    /// Override the endpoint URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint
    }

    /// Post a rendered SOAP document and parse the answer.
    ///
    /// # Errors
    ///
    /// `Connection` on transport failures, `Server` on server faults,
    /// `Validation` on client faults, unexpected HTTP statuses and
    /// submissions refused as a whole.
    pub async fn submit(&self, document: impl Into<Vec<u8>>) -> Result<SubmissionResponse, VerifactuError> {
        let document = document.into();
        tracing::debug!(endpoint = %self.endpoint, bytes = document.len(), "posting submission");

        let resp = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(document)
            .send()
            .await
            .map_err(|e| VerifactuError::Connection(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| VerifactuError::Connection(e.to_string()))?;

        tracing::debug!(status = status.as_u16(), "gateway answered");

        if !status.is_success() {
            // Faults come back with HTTP 500 and still carry the reason.
            return match xml::from_response_xml(&body) {
                Err(e @ (VerifactuError::Server(_) | VerifactuError::Validation(_))) => Err(e),
                _ => Err(VerifactuError::Validation(format!("HTTP {}", status.as_u16()))),
            };
        }

        let response = xml::from_response_xml(&body)?;
        if let Some(err) = response.rejection() {
            tracing::warn!(%err, "submission rejected");
            return Err(err);
        }
        Ok(response)
    }

    /// Render, envelop and post sealed records.
    pub async fn submit_records(
        &self,
        config: &Config,
        issuer: &Taxpayer,
        records: &[Record],
    ) -> Result<SubmissionResponse, VerifactuError> {
        let document = xml::to_envelope_xml(config, issuer, records)?;
        self.submit(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_follows_environment() {
        let gw = GatewayClient::with_defaults(Environment::Sandbox).unwrap();
        assert_eq!(gw.endpoint_url(), Environment::Sandbox.gateway_endpoint());
        assert!(gw.endpoint_url().starts_with("https://"));

        let gw = GatewayClient::with_defaults(Environment::Production).unwrap();
        assert_eq!(gw.endpoint_url(), Environment::Production.gateway_endpoint());
    }

    #[test]
    fn endpoint_override() {
        let gw = GatewayClient::with_defaults(Environment::Sandbox)
            .unwrap()
            .endpoint("http://localhost:8080/verifactu");
        assert_eq!(gw.endpoint_url(), "http://localhost:8080/verifactu");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_connection_error() {
        let gw = GatewayClient::with_defaults(Environment::Sandbox)
            .unwrap()
            .endpoint("http://127.0.0.1:9/");
        let err = gw.submit("<x/>").await.unwrap_err();
        assert!(matches!(err, VerifactuError::Connection(_)));
        assert!(err.is_retryable());
    }
}
