//! Container formats.
//!
//! Detects image formats from magic bytes and file extensions. Decoding
//! always goes by content; extensions are only consulted when saving.

use std::fmt;
use std::path::Path;

/// Supported image containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// GIF format.
    Gif,
    /// WebP format.
    WebP,
    /// Netpbm family (PBM, PGM, PPM, PAM).
    Pnm,
    /// TIFF format.
    Tiff,
    /// Truevision TGA format.
    Tga,
    /// DirectDraw Surface format.
    Dds,
    /// Windows bitmap format.
    Bmp,
    /// Windows icon format.
    Ico,
    /// Radiance HDR format.
    Hdr,
    /// OpenEXR format.
    OpenExr,
    /// Farbfeld format.
    Farbfeld,
    /// AVIF format.
    Avif,
    /// Quite OK Image format.
    Qoi,
}

impl ImageFormat {
    /// All formats, in declaration order.
    pub const ALL: [ImageFormat; 15] = [
        Self::Png,
        Self::Jpeg,
        Self::Gif,
        Self::WebP,
        Self::Pnm,
        Self::Tiff,
        Self::Tga,
        Self::Dds,
        Self::Bmp,
        Self::Ico,
        Self::Hdr,
        Self::OpenExr,
        Self::Farbfeld,
        Self::Avif,
        Self::Qoi,
    ];

    /// Detects format from raw bytes (magic number check).
    ///
    /// TGA has no signature and is never detected here.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        const SIGNATURES: &[(&[u8], ImageFormat)] = &[
            (&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], ImageFormat::Png),
            (&[0xFF, 0xD8, 0xFF], ImageFormat::Jpeg),
            (b"GIF87a", ImageFormat::Gif),
            (b"GIF89a", ImageFormat::Gif),
            (&[0x49, 0x49, 0x2A, 0x00], ImageFormat::Tiff),
            (&[0x4D, 0x4D, 0x00, 0x2A], ImageFormat::Tiff),
            (b"DDS ", ImageFormat::Dds),
            (b"BM", ImageFormat::Bmp),
            (&[0x00, 0x00, 0x01, 0x00], ImageFormat::Ico),
            (b"#?RADIANCE", ImageFormat::Hdr),
            (b"#?RGBE", ImageFormat::Hdr),
            (&[0x76, 0x2F, 0x31, 0x01], ImageFormat::OpenExr),
            (b"farbfeld", ImageFormat::Farbfeld),
            (b"qoif", ImageFormat::Qoi),
        ];

        for (magic, format) in SIGNATURES {
            if bytes.starts_with(magic) {
                return Some(*format);
            }
        }

        // WebP: RIFF....WEBP
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        // AVIF: ftyp box with an AV1 brand
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            let brand = &bytes[8..12];
            if brand == b"avif" || brand == b"avis" {
                return Some(Self::Avif);
            }
        }

        // PNM: P1..P7 followed by whitespace
        if bytes.len() >= 3
            && bytes[0] == b'P'
            && (b'1'..=b'7').contains(&bytes[1])
            && bytes[2].is_ascii_whitespace()
        {
            return Some(Self::Pnm);
        }

        None
    }

    /// Detects format from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Some(match ext.as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" | "jpe" | "jfif" => Self::Jpeg,
            "gif" => Self::Gif,
            "webp" => Self::WebP,
            "pnm" | "pbm" | "pgm" | "ppm" | "pam" => Self::Pnm,
            "tif" | "tiff" => Self::Tiff,
            "tga" => Self::Tga,
            "dds" => Self::Dds,
            "bmp" => Self::Bmp,
            "ico" => Self::Ico,
            "hdr" | "pic" | "rgbe" => Self::Hdr,
            "exr" => Self::OpenExr,
            "ff" | "farbfeld" => Self::Farbfeld,
            "avif" => Self::Avif,
            "qoi" => Self::Qoi,
            _ => return None,
        })
    }

    /// Detects format from the extension of `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the typical file extension for this format.
    pub fn extension(self) -> &'static str {
        self.extensions()[0]
    }

    /// All extensions recognized for this format, preferred first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            Self::Gif => &["gif"],
            Self::WebP => &["webp"],
            Self::Pnm => &["pnm", "pbm", "pgm", "ppm", "pam"],
            Self::Tiff => &["tif", "tiff"],
            Self::Tga => &["tga"],
            Self::Dds => &["dds"],
            Self::Bmp => &["bmp"],
            Self::Ico => &["ico"],
            Self::Hdr => &["hdr", "pic", "rgbe"],
            Self::OpenExr => &["exr"],
            Self::Farbfeld => &["ff", "farbfeld"],
            Self::Avif => &["avif"],
            Self::Qoi => &["qoi"],
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Pnm => "image/x-portable-anymap",
            Self::Tiff => "image/tiff",
            Self::Tga => "image/x-targa",
            Self::Dds => "image/vnd-ms.dds",
            Self::Bmp => "image/bmp",
            Self::Ico => "image/x-icon",
            Self::Hdr => "image/vnd.radiance",
            Self::OpenExr => "image/x-exr",
            Self::Farbfeld => "application/octet-stream",
            Self::Avif => "image/avif",
            Self::Qoi => "image/qoi",
        }
    }

    /// Whether a decoder for this format is built in.
    pub fn can_read(self) -> bool {
        !matches!(self, Self::Avif)
    }

    /// Whether an encoder for this format is built in.
    pub fn can_write(self) -> bool {
        !matches!(self, Self::Dds)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::WebP => "WebP",
            Self::Pnm => "PNM",
            Self::Tiff => "TIFF",
            Self::Tga => "TGA",
            Self::Dds => "DDS",
            Self::Bmp => "BMP",
            Self::Ico => "ICO",
            Self::Hdr => "HDR",
            Self::OpenExr => "OpenEXR",
            Self::Farbfeld => "farbfeld",
            Self::Avif => "AVIF",
            Self::Qoi => "QOI",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_bytes(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_bytes(b"P6\n2 2\n255\n"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::from_bytes(b"#?RADIANCE\n"), Some(ImageFormat::Hdr));
        assert_eq!(ImageFormat::from_bytes(b"farbfeld\0\0"), Some(ImageFormat::Farbfeld));
        assert_eq!(ImageFormat::from_bytes(b"\0\0\0\x1cftypavif"), Some(ImageFormat::Avif));
    }

    #[test]
    fn test_unknown_bytes() {
        assert_eq!(ImageFormat::from_bytes(&[0x00, 0x01]), None);
        assert_eq!(ImageFormat::from_bytes(&[]), None);
        assert_eq!(ImageFormat::from_bytes(b"Plain text"), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension(".jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("xyz"), None);
        assert_eq!(ImageFormat::from_path("out/a.tiff"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_path("noext"), None);
    }

    #[test]
    fn test_preferred_extension_roundtrip() {
        for format in ImageFormat::ALL {
            assert_eq!(ImageFormat::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(!ImageFormat::Avif.can_read());
        assert!(ImageFormat::Avif.can_write());
        assert!(!ImageFormat::Dds.can_write());
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }
}
