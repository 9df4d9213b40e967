use thiserror::Error;

/// Failure of a single feed. Never fatal on its own; see [`ServiceError`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("No VEVENT found in feed from {url}")]
    MalformedFeed { url: String },
}

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: no enabled calendar sources with a URL")]
    NoEnabledSources,

    #[error("All {failed} calendar sources failed")]
    AllSourcesFailed { failed: usize },

    #[error(transparent)]
    FetchError(#[from] FetchError),

    #[error(transparent)]
    RfcError(#[from] calfeed_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] calfeed_core::error::CoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
