//! 8-bit pixel sample and luminance weights.
//!
//! [`Rgba`] is what point queries return regardless of the stored layout.
//! Narrowing from 16-bit or float layouts is lossy.

use std::fmt;

/// Rec.709 luminance coefficient for red channel.
///
/// Used in the standard luminance formula: `Y = 0.2126*R + 0.7152*G + 0.0722*B`
pub const REC709_LUMA_R: f32 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f32 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f32 = 0.0722;

/// Rec.709 luminance of normalized RGB.
///
/// # Example
/// ```
/// use dynimg_core::luminance_rec709;
/// assert!((luminance_rec709(1.0, 1.0, 1.0) - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn luminance_rec709(r: f32, g: f32, b: f32) -> f32 {
    r * REC709_LUMA_R + g * REC709_LUMA_G + b * REC709_LUMA_B
}

/// 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Creates a pixel from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Grey pixel with full alpha.
    #[inline]
    pub const fn from_luma(l: u8) -> Self {
        Self([l, l, l, 255])
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        self.0[0]
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        self.0[1]
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        self.0[2]
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0[3]
    }

    /// Channels as an array.
    #[inline]
    pub const fn channels(self) -> [u8; 4] {
        self.0
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(v: [u8; 4]) -> Self {
        Self(v)
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(p: Rgba) -> Self {
        p.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "rgba({r}, {g}, {b}, {a})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert_relative_eq!(REC709_LUMA_R + REC709_LUMA_G + REC709_LUMA_B, 1.0, epsilon = 1e-6);
        assert_relative_eq!(luminance_rec709(0.0, 1.0, 0.0), 0.7152);
    }

    #[test]
    fn test_accessors() {
        let p = Rgba::new(1, 2, 3, 4);
        assert_eq!((p.r(), p.g(), p.b(), p.a()), (1, 2, 3, 4));
        assert_eq!(Rgba::from_luma(9).channels(), [9, 9, 9, 255]);
        assert_eq!(p.to_string(), "rgba(1, 2, 3, 4)");
    }
}
