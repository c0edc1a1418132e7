use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Manifest request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Manifest endpoint {endpoint} returned HTTP {status}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("Malformed manifest: {source}")]
    MalformedManifestError {
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not measure icon {url}: {reason}")]
    IconProbeError { url: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ViewerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViewerError::NetworkError(_) | ViewerError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            ViewerError::MalformedManifestError { .. }
            | ViewerError::SerializationError(_)
            | ViewerError::IconProbeError { .. } => ErrorCategory::Data,
            ViewerError::IoError(_) => ErrorCategory::Io,
            ViewerError::ConfigValidationError { .. }
            | ViewerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以稍後重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ViewerError::NetworkError(_) => {
                "Check your network connection and that the manifest endpoint is reachable"
            }
            ViewerError::HttpStatusError { .. } => {
                "Verify the manifest endpoint URL; the server did not return a successful response"
            }
            ViewerError::MalformedManifestError { .. } => {
                "The endpoint must serve a JSON array of objects with `image_url` and `domains`"
            }
            ViewerError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            ViewerError::SerializationError(_) => "Inspect the input data for invalid values",
            ViewerError::IconProbeError { .. } => {
                "The icon URL did not serve a decodable image; declare `sizes` or drop the link"
            }
            ViewerError::ConfigValidationError { .. }
            | ViewerError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again (see --help)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ViewerError::NetworkError(_) => {
                "Could not reach the icon manifest endpoint.".to_string()
            }
            ViewerError::HttpStatusError { status, .. } => {
                format!("The icon manifest could not be downloaded (HTTP {}).", status)
            }
            ViewerError::MalformedManifestError { .. } => {
                "The icon manifest is not in the expected format.".to_string()
            }
            ViewerError::IoError(e) => format!("Could not write the output: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
