//! Upload intake: the bytes the user handed over, plus what the host knows
//! about them.
//!
//! [`SourceImage::from_upload`] is the fail-fast gate the host calls when a
//! file is dropped or picked. It rejects anything that is not a supported
//! raster image with [`GridError::UnsupportedFormat`] before a single pixel
//! is decoded. [`SourceImage::new`] skips the gate; the resampler still
//! sniffs the bytes itself, so nothing unsupported reaches a decoder.

use crate::error::{GridError, Result};
use crate::imaging::{BackendError, ImageBackend, SourceFormat};
use std::sync::Arc;

/// Raw bytes of one uploaded image file.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Arc<[u8]>,
    media_type: Option<String>,
    file_name: Option<String>,
}

impl SourceImage {
    /// Wrap bytes with no host metadata.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: None,
            file_name: None,
        }
    }

    /// Accept an upload, checking the declared media type and the actual
    /// container signature.
    ///
    /// - a declared media type outside `image/*` is rejected
    /// - empty input is rejected
    /// - a recognised but unsupported container (GIF, BMP, ...) is rejected
    /// - bytes with no recognisable signature are also rejected here, since
    ///   the upload cannot be an image the pipeline can read
    pub fn from_upload<B>(
        backend: &B,
        bytes: impl Into<Arc<[u8]>>,
        media_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<(Self, SourceFormat)>
    where
        B: ImageBackend + ?Sized,
    {
        if let Some(mt) = media_type.filter(|mt| !is_image_media_type(mt)) {
            return Err(GridError::UnsupportedFormat(format!(
                "declared media type '{mt}' is not an image"
            )));
        }

        let source = Self {
            bytes: bytes.into(),
            media_type: media_type.map(str::to_string),
            file_name: file_name.map(str::to_string),
        };
        if source.bytes.is_empty() {
            return Err(GridError::UnsupportedFormat("upload is empty".into()));
        }

        let format = backend.sniff(&source.bytes).map_err(|e| match e {
            BackendError::Unrecognized => GridError::UnsupportedFormat(format!(
                "{} is not a recognised image",
                source.display_name()
            )),
            other => GridError::UnsupportedFormat(other.to_string()),
        })?;

        Ok((source, format))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Name for log and error messages.
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

impl From<Vec<u8>> for SourceImage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// `image/*`, ignoring case and any parameters.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(str::trim)
        .and_then(|essence| essence.split_once('/'))
        .is_some_and(|(kind, sub)| kind.eq_ignore_ascii_case("image") && !sub.is_empty())
}
