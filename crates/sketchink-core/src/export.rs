//! Snapshot export requests.
//!
//! The core never rasterizes. It describes what is wanted and hands the
//! request to a [`SnapshotSurface`] supplied by the rendering side.

use serde::{Deserialize, Serialize};

/// Encoded image formats a surface can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Default and maximum encoding quality.
pub const MAX_QUALITY: u8 = 100;

/// Format and quality of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotOptions {
    pub format: ImageFormat,
    /// Encoding quality in `0..=100`.
    pub quality: u8,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: MAX_QUALITY,
        }
    }
}

impl SnapshotOptions {
    /// Fill in defaults and clamp quality to `0..=100`.
    pub fn resolve(format: Option<ImageFormat>, quality: Option<u8>) -> Self {
        Self {
            format: format.unwrap_or_default(),
            quality: quality.unwrap_or(MAX_QUALITY).min(MAX_QUALITY),
        }
    }
}

/// Something that can hand out an image of what was last painted.
pub trait SnapshotSurface {
    /// Decoded image type of this surface.
    type Image;

    /// Current contents, or `None` if nothing has been painted yet.
    fn make_image_snapshot(&self) -> Option<Self::Image>;

    /// Encode the current contents and return them base64 encoded.
    ///
    /// Returns `None` if there is no content or encoding failed.
    fn encode_to_base64(&self, options: SnapshotOptions) -> Option<String>;
}
