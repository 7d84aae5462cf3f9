//! Content source error types

use thiserror::Error;

/// Errors raised while talking to the content source
#[derive(Error, Debug)]
pub enum CmsError {
    /// Transport-level failure (connect, TLS, body read), URL stripped
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The API answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body was not the expected JSON shape
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The API root did not advertise a master ref
    #[error("no master ref advertised by {0}")]
    NoMasterRef(String),

    /// No document of the given type has this uid
    #[error("document not found: {document_type}/{uid}")]
    NotFound { document_type: String, uid: String },

    /// Endpoint or cursor URL could not be parsed
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl CmsError {
    /// Whether this error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsError::NotFound { .. })
    }
}
