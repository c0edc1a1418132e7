use crate::utils::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One manifest entry: an icon and the domains that use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconRecord {
    pub image_url: String,
    pub domains: Vec<String>,
}

impl IconRecord {
    pub fn new(image_url: impl Into<String>, domains: Vec<String>) -> Self {
        Self {
            image_url: image_url.into(),
            domains,
        }
    }
}

/// Ordered icon records. Insertion order is rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    records: Vec<IconRecord>,
}

impl Manifest {
    pub fn new(records: Vec<IconRecord>) -> Self {
        Self { records }
    }

    /// 解析 manifest JSON (物件陣列)
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|source| ViewerError::MalformedManifestError { source })
    }

    pub fn from_json_str(body: &str) -> Result<Self> {
        Self::from_json_slice(body.as_bytes())
    }

    pub fn records(&self) -> &[IconRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IconRecord> {
        self.records.iter()
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| {
            ViewerError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a IconRecord;
    type IntoIter = std::slice::Iter<'a, IconRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// View model for one rendered tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub image_src: String,
    pub hover_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loaded,
    Failed,
    Blank,
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub state: PageState,
    pub tiles: Vec<Tile>,
    pub html: String,
}

/// What to publish when the manifest cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Propagate the error and publish nothing.
    Surface,
    /// Publish an explicit "failed to load" page, then propagate the error.
    #[default]
    FailurePage,
    /// Publish a page with an empty mount point and report success.
    Silent,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Surface => "surface",
            FailurePolicy::FailurePage => "failure_page",
            FailurePolicy::Silent => "silent",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "surface" => Ok(FailurePolicy::Surface),
            "failure_page" => Ok(FailurePolicy::FailurePage),
            "silent" => Ok(FailurePolicy::Silent),
            _ => Err(ViewerError::InvalidConfigValueError {
                field: "on_failure".to_string(),
                value: s.to_string(),
                reason: "Valid policies: surface, failure_page, silent".to_string(),
            }),
        }
    }
}
