//! Decoded pixel type.
//!
//! The codec hands over 8-bit RGB pixels. The filter pipeline works on a
//! single luminance channel obtained by averaging the three components.

/// 8-bit RGB pixel as produced by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Creates a pixel from its components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray pixel with all three components set to `v`, clamped to `[0, 255]`.
    #[inline]
    pub fn gray(v: i32) -> Self {
        let v = v.clamp(0, 255) as u8;
        Self { r: v, g: v, b: v }
    }

    /// Luminance as the truncated mean of R, G and B, clamped to `[0, 255]`.
    ///
    /// ```
    /// use gifpar_core::Rgb;
    /// assert_eq!(Rgb::new(10, 20, 31).luma(), 20);
    /// ```
    #[inline]
    pub fn luma(&self) -> i32 {
        let sum = self.r as i32 + self.g as i32 + self.b as i32;
        (sum / 3).clamp(0, 255)
    }
}
