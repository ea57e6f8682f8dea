//! The in-memory pixel grid consumed by the encoder and produced by the decoder.

use crate::pixel::Pixel;

/// The error type for building an [Image] from caller supplied data.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    /// The amount of pixels doesn't match `width * height`.
    #[error("expected {expected} pixels, got {actual}")]
    PixelCount { expected: usize, actual: usize },
    /// The amount of RGBA bytes doesn't match `width * height * 4`.
    #[error("expected {expected} bytes of RGBA data, got {actual}")]
    ByteCount { expected: usize, actual: usize },
}

/// A row-major grid of 8-bit RGBA pixels, without padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl Image {
    /// Wrap `pixels` into an image of the given size.
    ///
    /// # Errors
    ///
    /// Fails with [ImageError::PixelCount] if `pixels` doesn't hold exactly
    /// `width * height` pixels. Zero sized images are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use qoif::{Image, Pixel};
    ///
    /// let image = Image::new(2, 1, vec![Pixel::rgb(10, 20, 30); 2]).unwrap();
    /// assert_eq!(image.pixel(1, 0), Some(Pixel::rgb(10, 20, 30)));
    ///
    /// assert!(Image::new(2, 2, vec![Pixel::rgb(10, 20, 30); 2]).is_err());
    /// ```
    pub fn new(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self, ImageError> {
        let expected = area(width, height);
        if expected != Some(pixels.len()) {
            return Err(ImageError::PixelCount {
                expected: expected.unwrap_or(usize::MAX),
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image from packed RGBA bytes, 4 per pixel.
    ///
    /// # Errors
    ///
    /// Fails with [ImageError::ByteCount] if `data` doesn't hold exactly
    /// `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = area(width, height).and_then(|area| area.checked_mul(4));
        if expected != Some(data.len()) {
            return Err(ImageError::ByteCount {
                expected: expected.unwrap_or(usize::MAX),
                actual: data.len(),
            });
        }

        let pixels = data
            .chunks_exact(4)
            .map(|rgba| Pixel::rgba(rgba[0], rgba[1], rgba[2], rgba[3]))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An image where every pixel is `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![pixel; count],
        }
    }

    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(area(width, height), Some(pixels.len()));
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// The pixel at column `x` and row `y`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels.get(index).copied()
    }

    /// Pack the pixels into RGBA bytes, 4 per pixel.
    pub fn to_raw(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&pixel| <[u8; 4]>::from(pixel))
            .collect()
    }

    /// Consume the image, returning its pixels.
    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }
}

fn area(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

impl From<&::image::RgbaImage> for Image {
    fn from(rgba: &::image::RgbaImage) -> Self {
        let pixels = rgba.pixels().map(|pixel| Pixel::from(pixel.0)).collect();
        Self::from_parts(rgba.width(), rgba.height(), pixels)
    }
}

/// Any color type is first converted to non-premultiplied 8-bit RGBA.
impl From<&::image::DynamicImage> for Image {
    fn from(dynamic: &::image::DynamicImage) -> Self {
        Self::from(&dynamic.to_rgba8())
    }
}

impl From<Image> for ::image::RgbaImage {
    fn from(image: Image) -> Self {
        let width = image.width;
        ::image::RgbaImage::from_fn(image.width, image.height, |x, y| {
            let pixel = image.pixels[y as usize * width as usize + x as usize];
            ::image::Rgba(pixel.into())
        })
    }
}
