use crate::domain::model::Manifest;
use crate::utils::error::{Result, ViewerError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_MANIFEST_ENDPOINT: &str =
    "https://activity-stream-icons.services.mozilla.com/v1/icons.json.br";

/// Downloads and parses the icon manifest with a single GET request.
pub struct ManifestFetcher {
    client: Client,
    endpoint: String,
}

impl ManifestFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ViewerError::InvalidConfigValueError {
                    field: "source.headers".to_string(),
                    value: name.clone(),
                    reason: format!("Invalid header name: {}", e),
                }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                ViewerError::InvalidConfigValueError {
                    field: format!("source.headers.{}", name),
                    value: value.clone(),
                    reason: format!("Invalid header value: {}", e),
                }
            })?;
            header_map.insert(header_name, header_value);
        }

        let mut builder = Client::builder().default_headers(header_map);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub async fn fetch(&self) -> Result<Manifest> {
        tracing::debug!("Requesting manifest from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        tracing::debug!("Manifest response status: {}", status);

        if !status.is_success() {
            return Err(ViewerError::HttpStatusError {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        // brotli 解壓由 reqwest 依 Content-Encoding 自動處理
        let body = response.bytes().await?;
        tracing::debug!("Manifest body: {} bytes", body.len());

        let manifest = Manifest::from_json_slice(&body)?;
        tracing::debug!("Parsed {} icon records", manifest.len());
        Ok(manifest)
    }
}
