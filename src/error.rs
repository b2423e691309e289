use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Everything that can go wrong while turning an image into text.
///
/// Every variant is terminal for the call that produced it.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The image file could not be read. No request was sent.
    #[error("Could not read image file `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The connection could not be established, or broke mid-transfer.
    #[error("Could not reach `{url}`")]
    Network {
        url: String,
        #[source]
        source: attohttpc::Error,
    },

    #[error("Request to `{url}` timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// The service answered with a non-2xx status.
    #[error("`{url}` responded with status {status}: {body}")]
    Http { url: String, status: u16, body: String },

    /// The response body was not the shape we expect.
    #[error("Malformed response from `{url}`: {reason}")]
    Parse { url: String, reason: String },

    /// A successful response that reports an error inside its body.
    #[error("`{url}` reported an error: {message}")]
    Provider { url: String, message: String },

    #[error("Invalid OCR service configuration: {0}")]
    Config(String),
}

impl OcrError {
    /// Classifies an error raised by the HTTP client while sending a request or reading its body.
    pub(crate) fn from_transport(url: &str, timeout: Duration, source: attohttpc::Error) -> Self {
        if let attohttpc::ErrorKind::Io(io) = source.kind() {
            // attohttpc enforces its deadline through socket timeouts, which surface as either kind
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return Self::Timeout {
                    url: url.to_owned(),
                    timeout,
                };
            }
        }

        Self::Network {
            url: url.to_owned(),
            source,
        }
    }
}
