/// A non-premultiplied 8-bit RGBA pixel.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// The pixel every encoding or decoding pass starts from: opaque black.
    pub const START: Pixel = Pixel::rgba(0, 0, 0, 255);

    /// Opaque magenta, produced by the decoder for a tag byte it cannot classify.
    pub const SENTINEL: Pixel = Pixel::rgba(255, 0, 255, 255);

    /// Create a new pixel.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a pixel with a full (255) alpha channel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Transparent black, the content of an empty cache slot.
    #[inline]
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// XOR of the four components. The color cache slot is this value modulo 64.
    #[inline]
    pub const fn hash(self) -> u8 {
        self.r ^ self.g ^ self.b ^ self.a
    }

    /// Add signed deltas to each channel, wrapping modulo 256.
    #[inline]
    pub(crate) const fn offset(self, r: i8, g: i8, b: i8, a: i8) -> Self {
        Self {
            r: self.r.wrapping_add_signed(r),
            g: self.g.wrapping_add_signed(g),
            b: self.b.wrapping_add_signed(b),
            a: self.a.wrapping_add_signed(a),
        }
    }
}

impl From<[u8; 4]> for Pixel {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Pixel> for [u8; 4] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        [pixel.r, pixel.g, pixel.b, pixel.a]
    }
}
