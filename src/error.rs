//! Error types for the sprite-cleanup crate.

/// Errors that can occur during sprite generation and cleanup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// A required credential environment variable is unset or empty.
    #[cfg(feature = "generate")]
    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[cfg(feature = "generate")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The generation API returned a non-success status.
    #[cfg(feature = "generate")]
    #[error("generation API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message extracted from the response body, if any.
        message: String,
    },

    /// The API response was missing the expected image payload field.
    #[cfg(feature = "generate")]
    #[error("generation API response contained no image data")]
    MissingImageData,

    /// The inline image payload was not valid base64.
    #[cfg(feature = "generate")]
    #[error("failed to decode base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A manifest or response body was not valid JSON.
    #[cfg(feature = "generate")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));
    }

    #[cfg(feature = "generate")]
    #[test]
    fn api_error_includes_status_and_message() {
        let err = Error::Api {
            status: 429,
            message: "rate limit exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limit exceeded"));
    }

    #[cfg(feature = "generate")]
    #[test]
    fn missing_credential_names_the_variable() {
        let err = Error::MissingCredential("GEMINI_API_KEY");
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
