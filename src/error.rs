use thiserror::Error;

/// Errors returned by try-on operations.
///
/// Only [`TryonError::Busy`] is produced by the remote service path; the
/// other variants come from local validation, configuration or file I/O.
#[derive(Error, Debug)]
pub enum TryonError {
    /// The service could not take or finish the job. The display text is the
    /// fixed user-facing phrase; `reason` carries the technical detail.
    #[error("Too many users, please try again later")]
    Busy { reason: String },

    /// A caller-supplied seed outside `0..=MAX_SEED`.
    #[error("Seed {0} is outside the allowed range 0..=999999")]
    InvalidSeed(u32),

    /// A required environment variable was not set.
    #[error("Missing environment variable `{0}`")]
    MissingEnv(String),

    /// A credential could not be sent as an HTTP header value.
    #[error("Credential `{0}` is not a valid header value")]
    InvalidHeader(&'static str),

    /// Image encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Filesystem failure with context.
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl TryonError {
    pub(crate) fn busy(reason: impl Into<String>) -> Self {
        TryonError::Busy {
            reason: reason.into(),
        }
    }
}

/// Errors from the image codec.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TryonError>;
