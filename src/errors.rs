use thiserror::Error;

use crate::validation::ErrorReport;
use crate::video::VideoId;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents one or more field violations in a submission.
    #[error("submission has incorrect values")]
    Validation(ErrorReport),

    /// Represents a request body that isn't a JSON object.
    #[error("malformed request body")]
    MalformedBody(#[source] serde_json::Error),

    /// Represents a request body over the size limit.
    #[error("request body too large: {length} bytes")]
    BodyTooLarge { length: usize },

    /// Represents an ID in a path that can't be parsed.
    #[error("invalid ID: {0}")]
    InvalidId(String),

    /// Represents an ID with no matching video.
    #[error("video not found: {0}")]
    NotFound(VideoId),

    /// Represents an attempt to store a second video under an existing ID.
    #[error("video ID already exists: {0}")]
    DuplicateId(VideoId),

    /// Represents a store whose lock was poisoned by a panicking writer.
    #[error("store unavailable")]
    StorePoisoned,

    /// Represents a failure to render a timestamp.
    #[error("failed to format timestamp")]
    TimestampFormat {
        #[from]
        source: time::error::Format,
    },
}
