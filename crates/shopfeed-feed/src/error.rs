use thiserror::Error;

/// Failure of a remote image size probe.
///
/// Probe failures are never cached: the next lookup retries from scratch.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("could not read image dimensions from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("image at {url} reported zero dimensions ({width}x{height})")]
    ZeroDimension {
        url: String,
        width: u32,
        height: u32,
    },
}
