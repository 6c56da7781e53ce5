//! Sample types.
//!
//! A [`Sample`] is one channel value of one pixel. Three types implement it:
//! `u8`, `u16` and `f32`. Integer samples map to the normalized range
//! `[0.0, 1.0]` when converted to `f32`, float samples pass through unchanged.
//!
//! ```
//! use dynimg_core::Sample;
//!
//! assert_eq!(u8::from_f32(1.0), 255);
//! assert_eq!(u16::from_f32(0.5), 32768);
//! assert_eq!(<u8 as Sample>::to_f32(0), 0.0);
//! ```

/// Trait for pixel sample types.
///
/// `Pod` lets buffers of any sample type be viewed as bytes without copying.
pub trait Sample:
    bytemuck::Pod + Default + PartialOrd + Send + Sync + std::fmt::Debug + 'static
{
    /// Number of bits per sample.
    const BITS: u32;

    /// Whether this is a floating-point sample.
    const IS_FLOAT: bool;

    /// Value of a fully saturated sample in its own units.
    ///
    /// - 255 for u8
    /// - 65535 for u16
    /// - 1.0 for f32
    const MAX_VALUE: f32;

    /// Convert to f32, normalizing integers into `[0.0, 1.0]`.
    fn to_f32(self) -> f32;

    /// Convert from normalized f32.
    ///
    /// Integers clamp to `[0.0, 1.0]` and round. Floats are the identity.
    fn from_f32(v: f32) -> Self;

    /// Convert from a value already expressed in sample units (`0..=MAX_VALUE`),
    /// saturating. Floats are the identity.
    fn saturate(v: f32) -> Self;

    /// Converts to a value in sample units.
    #[inline]
    fn to_units(self) -> f32 {
        self.to_f32() * Self::MAX_VALUE
    }

    /// Zero sample.
    #[inline]
    fn zero() -> Self {
        Self::default()
    }

    /// Opaque maximum (255, 65535 or 1.0).
    fn max_value() -> Self;
}

impl Sample for u8 {
    const BITS: u32 = 8;
    const IS_FLOAT: bool = false;
    const MAX_VALUE: f32 = 255.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / 255.0
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    #[inline]
    fn saturate(v: f32) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }

    #[inline]
    fn to_units(self) -> f32 {
        self as f32
    }

    #[inline]
    fn max_value() -> Self {
        u8::MAX
    }
}

impl Sample for u16 {
    const BITS: u32 = 16;
    const IS_FLOAT: bool = false;
    const MAX_VALUE: f32 = 65535.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / 65535.0
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        (v.clamp(0.0, 1.0) * 65535.0).round() as u16
    }

    #[inline]
    fn saturate(v: f32) -> Self {
        v.round().clamp(0.0, 65535.0) as u16
    }

    #[inline]
    fn to_units(self) -> f32 {
        self as f32
    }

    #[inline]
    fn max_value() -> Self {
        u16::MAX
    }
}

impl Sample for f32 {
    const BITS: u32 = 32;
    const IS_FLOAT: bool = true;
    const MAX_VALUE: f32 = 1.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }

    #[inline]
    fn saturate(v: f32) -> Self {
        v
    }

    #[inline]
    fn max_value() -> Self {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_u8_roundtrip() {
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(u8::from_f32(v.to_f32()), v);
        }
    }

    #[test]
    fn test_u16_roundtrip() {
        for v in [0u16, 257, 32768, 65535] {
            assert_eq!(u16::from_f32(v.to_f32()), v);
        }
    }

    #[test]
    fn test_from_f32_clamps() {
        assert_eq!(u8::from_f32(-0.5), 0);
        assert_eq!(u8::from_f32(2.0), 255);
        assert_eq!(u16::from_f32(1.5), 65535);
    }

    #[test]
    fn test_f32_identity() {
        assert_relative_eq!(f32::from_f32(1.5), 1.5);
        assert_relative_eq!((-0.25f32).to_f32(), -0.25);
    }

    #[test]
    fn test_saturate() {
        assert_eq!(u8::saturate(300.0), 255);
        assert_eq!(u8::saturate(-4.0), 0);
        assert_eq!(u8::saturate(12.4), 12);
        assert_eq!(u16::saturate(70000.0), 65535);
    }

    #[test]
    fn test_units() {
        assert_relative_eq!(200u8.to_units(), 200.0);
        assert_relative_eq!(1000u16.to_units(), 1000.0);
        assert_relative_eq!(0.5f32.to_units(), 0.5);
    }
}
