//! Image format detection
//!
//! Decides the file extension a downloaded image is saved under, from the
//! response bytes, the declared `Content-Type` and the reference URL.

mod sniffer;

pub use sniffer::{detect_signature, format_from_content_type, sniff_extension, sniff_format};

use std::fmt;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_FOURCC: &[u8] = b"WEBP";

/// Image formats the harvester can name a file after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    /// Vector markup; never detected from bytes
    Svg,
}

impl ImageFormat {
    /// Raster formats in the order they are tried during detection
    pub const RASTER: [ImageFormat; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    /// Every format a saved file can carry
    pub const ALL: [ImageFormat; 5] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp, Self::Svg];

    /// Format used when nothing else matches
    pub const FALLBACK: ImageFormat = Self::Jpeg;

    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Gif => ".gif",
            Self::Webp => ".webp",
            Self::Svg => ".svg",
        }
    }

    /// Returns true if `bytes` start with this format's magic signature
    ///
    /// Always false for SVG, which is plain text.
    pub fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            Self::Jpeg => bytes.starts_with(JPEG_MAGIC),
            Self::Png => bytes.starts_with(PNG_MAGIC),
            Self::Gif => bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC),
            Self::Webp => {
                bytes.len() >= 12 && bytes.starts_with(RIFF_MAGIC) && &bytes[8..12] == WEBP_FOURCC
            }
            Self::Svg => false,
        }
    }

    /// Substrings of a lowercased `Content-Type` that name this format
    pub fn content_type_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpeg", "jpg"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::Webp => &["webp"],
            Self::Svg => &["image/svg"],
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Webp => "WebP",
            Self::Svg => "SVG",
        };
        write!(f, "{}", name)
    }
}
