//! Contains the QOI stream encoder.

use std::io::{BufWriter, Write};

use bitstream_io::{BigEndian, BitWrite, BitWriter};

use crate::{
    cache::ColorCache,
    chunk::{Chunk, ChunkCounts, MAX_RUN},
    header::{Header, HEADER_SIZE},
    pixel::Pixel,
    raster::Image,
};

/// Marks the end of the chunk stream.
pub(crate) const PADDING: [u8; 4] = [0; 4];

/// The error type for encoding operations.
///
/// Encoding can only fail if the output does.
#[derive(thiserror::Error, Debug)]
pub enum EncodingError {
    /// An I/O error happened when writing data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything the encoder carries from one pixel to the next.
struct EncoderState {
    cache: ColorCache,
    previous: Pixel,
    run: u16,
    counts: ChunkCounts,
    bytes: usize,
}

impl EncoderState {
    fn new() -> Self {
        Self {
            cache: ColorCache::new(),
            previous: Pixel::START,
            run: 0,
            counts: ChunkCounts::default(),
            bytes: 0,
        }
    }

    /// Feed one pixel, writing zero, one or two chunks.
    #[inline]
    fn step<W: BitWrite>(
        &mut self,
        pixel: Pixel,
        last: bool,
        out: &mut W,
    ) -> std::io::Result<()> {
        if pixel == self.previous {
            self.run += 1;
        }

        // A pending run ends when the color changes, the run is full, or the image is.
        if self.run > 0 && (self.run == MAX_RUN || pixel != self.previous || last) {
            self.emit(Chunk::Run(self.run), out)?;
            self.run = 0;
        }

        if pixel != self.previous {
            let chunk = self.select(pixel);
            self.emit(chunk, out)?;
        }

        self.previous = pixel;
        Ok(())
    }

    /// Pick the cheapest chunk describing `pixel` given the previous one, updating the cache.
    fn select(&mut self, pixel: Pixel) -> Chunk {
        let index = ColorCache::index_of(pixel);
        if self.cache.lookup(index) == pixel {
            return Chunk::Index(index);
        }
        self.cache.store(index, pixel);

        let previous = self.previous;
        let r = pixel.r as i16 - previous.r as i16;
        let g = pixel.g as i16 - previous.g as i16;
        let b = pixel.b as i16 - previous.b as i16;
        let a = pixel.a as i16 - previous.a as i16;

        let small = -2..=1;
        let medium = -8..=7;
        let large = -16..=15;

        if a == 0 && small.contains(&r) && small.contains(&g) && small.contains(&b) {
            Chunk::Diff8 {
                r: r as i8,
                g: g as i8,
                b: b as i8,
            }
        } else if a == 0 && large.contains(&r) && medium.contains(&g) && medium.contains(&b) {
            Chunk::Diff16 {
                r: r as i8,
                g: g as i8,
                b: b as i8,
            }
        } else if [r, g, b, a].iter().all(|delta| large.contains(delta)) {
            Chunk::Diff24 {
                r: r as i8,
                g: g as i8,
                b: b as i8,
                a: a as i8,
            }
        } else {
            let changed = |now: u8, before: u8| (now != before).then_some(now);
            Chunk::Color([
                changed(pixel.r, previous.r),
                changed(pixel.g, previous.g),
                changed(pixel.b, previous.b),
                changed(pixel.a, previous.a),
            ])
        }
    }

    #[inline]
    fn emit<W: BitWrite>(&mut self, chunk: Chunk, out: &mut W) -> std::io::Result<()> {
        self.counts.record(&chunk);
        self.bytes += chunk.encoded_len();
        chunk.write(out)
    }
}

/// QOI encoder for RGBA images.
pub struct Encoder;

impl Encoder {
    /// Encode an image as a QOI stream: header, chunks, then 4 bytes of zero padding.
    ///
    /// The output is buffered internally and flushed before returning.
    ///
    /// # Arguments
    ///
    /// * `image` - The pixels to compress, in row-major order.
    /// * `into` - The output where compressed data should be written.
    ///
    /// # Errors
    ///
    /// This function only fails on an [std::io::Error] from `into`.
    ///
    /// # Examples
    ///
    /// ```
    /// use qoif::{
    ///     encoder::{Encoder, EncodingError},
    ///     Image, Pixel,
    /// };
    ///
    /// fn main() -> Result<(), EncodingError> {
    ///     let image = Image::filled(2, 1, Pixel::rgb(0, 0, 0));
    ///     let mut output = vec![];
    ///
    ///     Encoder::encode(&image, &mut output)?;
    ///
    ///     assert_eq!(&output[..4], b"qoif");
    ///     assert_eq!(&output[14..], [0x41, 0, 0, 0, 0]);
    ///     Ok(())
    /// }
    /// ```
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = image.width(), height = image.height())
    )]
    pub fn encode<W: Write>(image: &Image, into: W) -> Result<(), EncodingError> {
        let mut output = BufWriter::new(into);
        Header::new(image.width(), image.height()).write(&mut output)?;

        let mut writer = BitWriter::endian(&mut output, BigEndian);
        let mut state = EncoderState::new();

        let pixels = image.pixels();
        let last = pixels.len().saturating_sub(1);
        for (position, &pixel) in pixels.iter().enumerate() {
            state.step(pixel, position == last, &mut writer)?;
        }

        writer.write_bytes(&PADDING)?;
        drop(writer);
        output.flush()?;

        tracing::debug!(
            bytes = HEADER_SIZE + state.bytes + PADDING.len(),
            chunks = state.counts.total(),
            index = state.counts.index,
            run = state.counts.run,
            diff = state.counts.diff,
            color = state.counts.color,
            "image encoded"
        );

        Ok(())
    }

    /// Encode an image as a QOI stream.
    /// Convenient wrapper that creates a [Vec<u8>] under the hood.
    ///
    /// # Errors
    ///
    /// Writing to a [Vec] doesn't fail, but the signature mirrors [Encoder::encode].
    ///
    /// # Examples
    ///
    /// ```
    /// use qoif::{encoder::Encoder, Image, Pixel};
    ///
    /// let image = Image::filled(3, 3, Pixel::rgb(0, 0, 0));
    /// let output = Encoder::encode_to_vec(&image).unwrap();
    ///
    /// assert_eq!(output.len(), 14 + 1 + 4);
    /// ```
    pub fn encode_to_vec(image: &Image) -> Result<Vec<u8>, EncodingError> {
        let mut output = Vec::with_capacity(HEADER_SIZE + image.pixels().len() + PADDING.len());
        Encoder::encode(image, &mut output)?;
        Ok(output)
    }
}
