//! Remote image size probing.
//!
//! A probe reports an image's native pixel size without decoding the pixel
//! data. The HTTP implementation requests only the leading bytes of the file
//! and reads the dimensions from the format header.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shopfeed_core::AppConfig;

use crate::error::ProbeError;

/// Native pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    /// Height divided by width; `None` for a zero-width image.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0)
            .then(|| f64::from(self.height) / f64::from(self.width))
    }
}

#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// Resolves the native dimensions of the image at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] if the image cannot be fetched or its header
    /// cannot be read.
    async fn probe(&self, url: &str) -> Result<ImageSize, ProbeError>;
}

/// Probes images over HTTP with a ranged GET of the first `max_bytes` bytes.
///
/// The body is read chunk by chunk and the connection dropped once
/// `max_bytes` are buffered, so a server that ignores `Range` still costs at
/// most one chunk past the limit.
pub struct HttpImageProbe {
    client: Client,
    max_bytes: u64,
}

impl HttpImageProbe {
    /// # Errors
    ///
    /// Returns [`ProbeError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str, max_bytes: u64) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_bytes: max_bytes.max(1),
        })
    }

    /// # Errors
    ///
    /// Same as [`HttpImageProbe::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ProbeError> {
        Self::new(
            config.http_timeout_secs,
            &config.user_agent,
            config.probe_max_bytes,
        )
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn probe(&self, url: &str) -> Result<ImageSize, ProbeError> {
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, format!("bytes=0-{}", self.max_bytes - 1))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let limit = usize::try_from(self.max_bytes).unwrap_or(usize::MAX);
        let mut head: Vec<u8> = Vec::with_capacity(limit.min(64 * 1024));
        while head.len() < limit {
            let Some(chunk) = response.chunk().await? else {
                break;
            };
            let take = chunk.len().min(limit - head.len());
            head.extend_from_slice(&chunk[..take]);
        }
        drop(response);

        let size = read_dimensions(&head).map_err(|reason| ProbeError::Decode {
            url: url.to_owned(),
            reason,
        })?;

        if size.ratio().is_none() {
            return Err(ProbeError::ZeroDimension {
                url: url.to_owned(),
                width: size.width,
                height: size.height,
            });
        }
        Ok(size)
    }
}

/// Reads width/height from an image header without decoding pixels.
fn read_dimensions(bytes: &[u8]) -> Result<ImageSize, String> {
    let reader = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    if reader.format().is_none() {
        return Err("unrecognized image format".to_string());
    }
    let (width, height) = reader.into_dimensions().map_err(|e| e.to_string())?;
    Ok(ImageSize { width, height })
}
