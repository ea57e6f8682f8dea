//! Contains the QOI stream decoder.

use std::io::{BufReader, ErrorKind, Read};

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::{
    cache::ColorCache,
    chunk::{Chunk, ChunkCounts, Tag},
    header::Header,
    pixel::Pixel,
    raster::Image,
};

/// The stream doesn't look like QOI data.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The stream doesn't begin with `qoif`.
    #[error("invalid magic {0:?}, expected \"qoif\"")]
    InvalidMagic([u8; 4]),
    /// The stream ended before the 14 header bytes were read.
    #[error("truncated header")]
    TruncatedHeader,
    /// The declared size can't be held in memory.
    #[error("image of {width}x{height} pixels is too large")]
    DimensionsTooLarge { width: u32, height: u32 },
}

/// The error type for decoding operations.
#[derive(thiserror::Error, Debug)]
pub enum DecodingError {
    /// An I/O error happened when reading data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The header is not a valid QOI header.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Everything the decoder carries from one chunk to the next.
struct DecoderState {
    cache: ColorCache,
    current: Pixel,
    run: u16,
    counts: ChunkCounts,
}

impl DecoderState {
    fn new() -> Self {
        Self {
            cache: ColorCache::new(),
            current: Pixel::START,
            run: 0,
            counts: ChunkCounts::default(),
        }
    }

    /// Update the current pixel from a chunk.
    fn apply(&mut self, chunk: Chunk) {
        self.counts.record(&chunk);

        let current = self.current;
        let (pixel, from_cache) = match chunk {
            Chunk::Index(index) => (self.cache.lookup(index), true),
            Chunk::Run(run) => {
                self.run = run - 1;
                (current, false)
            }
            Chunk::Diff8 { r, g, b } | Chunk::Diff16 { r, g, b } => {
                (current.offset(r, g, b, 0), false)
            }
            Chunk::Diff24 { r, g, b, a } => (current.offset(r, g, b, a), false),
            Chunk::Color([r, g, b, a]) => {
                let pixel = Pixel::rgba(
                    r.unwrap_or(current.r),
                    g.unwrap_or(current.g),
                    b.unwrap_or(current.b),
                    a.unwrap_or(current.a),
                );
                (pixel, false)
            }
        };

        self.current = pixel;
        // An indexed pixel already sits at its slot.
        if !from_cache {
            self.cache.insert(pixel);
        }
    }

    fn apply_unknown(&mut self, byte: u8) {
        tracing::warn!(tag = byte, "unclassified chunk tag, substituting sentinel pixel");
        self.current = Pixel::SENTINEL;
        self.cache.insert(self.current);
    }

    /// Produce the next pixel. Returns `None` when the stream ends cleanly on a chunk boundary.
    #[inline]
    fn next<R: BitRead>(&mut self, from: &mut R) -> Result<Option<Pixel>, std::io::Error> {
        if self.run > 0 {
            self.run -= 1;
            return Ok(Some(self.current));
        }

        let byte = match from.read::<u8>(8) {
            Ok(byte) => byte,
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(error) => return Err(error),
        };

        match Tag::from_byte(byte) {
            Some(tag) => {
                let chunk = Chunk::read(tag, byte, from)?;
                self.apply(chunk);
            }
            None => self.apply_unknown(byte),
        }

        Ok(Some(self.current))
    }
}

/// QOI decoder producing RGBA images.
pub struct Decoder;

impl Decoder {
    /// Decode a QOI stream into an image of the size declared by its header.
    ///
    /// Decoding stops as soon as `width * height` pixels are produced, so the trailing padding
    /// is never read. If the stream ends on a chunk boundary before that, the remaining pixels
    /// are left transparent black.
    ///
    /// # Arguments
    ///
    /// * `from` - The compressed QOI stream, header included.
    ///
    /// # Errors
    ///
    /// This function fails with [DecodingError::Format] on a bad or truncated header, and with
    /// [DecodingError::Io] if reading fails or the stream ends in the middle of a chunk.
    ///
    /// # Examples
    ///
    /// ```
    /// use qoif::{
    ///     decoder::{Decoder, DecodingError},
    ///     Pixel,
    /// };
    ///
    /// fn main() -> Result<(), DecodingError> {
    ///     let data = [
    ///         b'q', b'o', b'i', b'f', 0, 0, 0, 2, 0, 0, 0, 1, 4, 0, // header
    ///         0x41, // run of 2
    ///         0, 0, 0, 0, // padding
    ///     ];
    ///
    ///     let image = Decoder::decode(&data[..])?;
    ///
    ///     assert_eq!(image.pixels(), [Pixel::rgb(0, 0, 0); 2]);
    ///     Ok(())
    /// }
    /// ```
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn decode<R: Read>(from: R) -> Result<Image, DecodingError> {
        let mut from = BufReader::new(from);
        let header = Header::read(&mut from)?;
        tracing::debug!(width = header.width, height = header.height, "header decoded");

        let too_large = || FormatError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        };
        let count = header
            .pixel_count()
            .filter(|count| count.checked_mul(4).is_some())
            .ok_or_else(too_large)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(count).map_err(|_| too_large())?;
        pixels.resize(count, Pixel::transparent());

        let mut reader = BitReader::endian(&mut from, BigEndian);
        let mut state = DecoderState::new();

        for (position, slot) in pixels.iter_mut().enumerate() {
            match state.next(&mut reader)? {
                Some(pixel) => *slot = pixel,
                None => {
                    tracing::warn!(
                        decoded = position,
                        expected = count,
                        "stream ended early, remaining pixels left transparent"
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            chunks = state.counts.total(),
            index = state.counts.index,
            run = state.counts.run,
            diff = state.counts.diff,
            color = state.counts.color,
            "image decoded"
        );

        Ok(Image::from_parts(header.width, header.height, pixels))
    }

    /// Decode a QOI stream held in memory.
    ///
    /// # Errors
    ///
    /// Same as [Decoder::decode].
    pub fn decode_from_slice(data: &[u8]) -> Result<Image, DecodingError> {
        Decoder::decode(data)
    }

    /// Read only the header, to learn the size of an image without decoding it.
    ///
    /// Exactly 14 bytes are consumed from `from` on success. On a bad magic, only 4 are.
    ///
    /// # Errors
    ///
    /// This function fails with [DecodingError::Format] on a bad or truncated header.
    ///
    /// # Examples
    ///
    /// ```
    /// use qoif::{decoder::Decoder, ColorModel};
    ///
    /// let data = [b'q', b'o', b'i', b'f', 0, 0, 1, 0, 0, 0, 0, 64, 4, 0];
    /// let header = Decoder::decode_header(&data[..]).unwrap();
    ///
    /// assert_eq!((header.width, header.height), (256, 64));
    /// assert_eq!(header.color_model(), ColorModel::Nrgba);
    /// ```
    pub fn decode_header<R: Read>(from: R) -> Result<Header, DecodingError> {
        Header::read(from)
    }
}
