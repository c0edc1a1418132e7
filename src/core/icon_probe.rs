use crate::utils::error::{Result, ViewerError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use std::io::Cursor;
use std::time::Duration;

/// Some sites only serve their touch icons to browser user agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.12; rv:58.0) Gecko/20100101 Firefox/58.0";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbedIcon {
    Svg,
    Raster { width: u32 },
}

/// Downloads one icon to learn its real size when `sizes` is missing.
#[derive(Debug, Clone)]
pub struct IconProber {
    client: Client,
}

impl IconProber {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn probe(&self, url: &str) -> Result<ProbedIcon> {
        tracing::debug!("Probing icon: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::HttpStatusError {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let is_svg = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or("").trim())
            .is_some_and(|mime| mime.eq_ignore_ascii_case("image/svg+xml"));
        if is_svg {
            return Ok(ProbedIcon::Svg);
        }

        let body = response.bytes().await?;
        let width = raster_width(&body).map_err(|reason| ViewerError::IconProbeError {
            url: url.to_string(),
            reason,
        })?;
        Ok(ProbedIcon::Raster { width })
    }
}

fn raster_width(body: &[u8]) -> std::result::Result<u32, String> {
    let reader = image::ImageReader::new(Cursor::new(body))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let (width, _) = reader.into_dimensions().map_err(|e| e.to_string())?;
    Ok(width)
}
