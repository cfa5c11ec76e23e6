//! Accent color derived from an author's avatar.
//!
//! The avatar is downsampled to a single pixel; that pixel's RGB value is the
//! color. Every failure degrades to "no color" and the renderer picks its
//! fallback instead.

use std::fmt;

use async_trait::async_trait;
use image::imageops::FilterType;
use tracing::{debug, warn};

/// A 24-bit RGB color. Displays as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(u32);

impl HexColor {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Integer form used for embed colours.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("avatar fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("avatar decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("avatar image has no pixels")]
    Empty,
}

/// Best-effort color lookup. Implementations never fail; they return `None`.
#[async_trait]
pub trait ColorSource: Send + Sync {
    async fn accent_color(&self, image_url: Option<&str>) -> Option<HexColor>;
}

/// Fetches avatars over HTTP and reduces them to one pixel.
#[derive(Debug, Clone, Default)]
pub struct AvatarColorExtractor {
    client: reqwest::Client,
}

impl AvatarColorExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    async fn extract(&self, url: &str) -> Result<HexColor, ColorError> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        color_from_bytes(&bytes)
    }
}

#[async_trait]
impl ColorSource for AvatarColorExtractor {
    async fn accent_color(&self, image_url: Option<&str>) -> Option<HexColor> {
        let url = image_url?;
        match self.extract(url).await {
            Ok(color) => {
                debug!(url, color = %color, "avatar accent color");
                Some(color)
            }
            Err(e) => {
                warn!(url, error = %e, "avatar color extraction failed, using fallback");
                None
            }
        }
    }
}

/// Decode an encoded image and return the color of its 1×1 reduction.
pub fn color_from_bytes(bytes: &[u8]) -> Result<HexColor, ColorError> {
    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ColorError::Empty);
    }
    let pixel = img.resize_exact(1, 1, FilterType::Triangle).to_rgb8();
    let [r, g, b] = pixel.get_pixel(0, 0).0;
    Ok(HexColor::from_rgb(r, g, b))
}
