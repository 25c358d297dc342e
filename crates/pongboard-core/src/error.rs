// Error taxonomy for the fetch pipeline.
//
// Only transport and parse failures are errors. Malformed cells are absorbed
// by the coercions in `scalar` and never surface here.

use thiserror::Error;

/// The HTTP layer could not deliver a successful response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP {status} {reason} for {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    Client { message: String },
}

/// The response body could not be tokenized into rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV body has no header row")]
    MissingHeader,

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

/// The single error value a data source reports to its consumer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FetchError {
    /// HTTP status code, when the failure was a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
