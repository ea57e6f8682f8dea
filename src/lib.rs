//! QOI encoder and decoder.
//!
//! This crate provides an [Encoder](encoder::Encoder) and a [Decoder](decoder::Decoder) for the
//! "Quite OK Image" format, in the variant with 8 and 16 bit runs, three sizes of color diffs and
//! per channel color chunks. It only handles 8-bit RGBA pixels, stored row-major without padding.
//!
//! Compression is lossless and done in a single pass: every pixel is described relative to the
//! previous one, either as part of a run, as a hit in a 64 slot cache of recent colors, as a small
//! delta, or as the channels that changed.
//!
//! It works with any [std::io::Read] and [std::io::Write].
//!
//! # Examples
//!
//! ```
//! use qoif::{decoder::Decoder, encoder::Encoder, Image, Pixel};
//!
//! let image = Image::new(2, 1, vec![Pixel::rgb(10, 20, 30); 2]).unwrap();
//!
//! let mut compressed = vec![];
//! Encoder::encode(&image, &mut compressed).unwrap();
//!
//! assert_eq!(&compressed[14..], [0xfe, 10, 20, 30, 0x40, 0, 0, 0, 0]);
//!
//! let decompressed = Decoder::decode(&compressed[..]).unwrap();
//!
//! assert_eq!(decompressed, image);
//! ```

pub mod cache;
mod chunk;
pub mod decoder;
pub mod encoder;
pub mod header;
mod pixel;
mod raster;

pub use chunk::MAX_RUN;
pub use header::{ColorModel, Header};
pub use pixel::Pixel;
pub use raster::{Image, ImageError};
