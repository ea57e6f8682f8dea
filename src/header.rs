//! The fixed 14 byte preamble of a QOI stream.

use std::io::{ErrorKind, Read, Write};

use bitstream_io::{BigEndian, ByteRead, ByteReader, ByteWrite, ByteWriter};

use crate::decoder::{DecodingError, FormatError};

/// The four bytes every stream starts with.
pub const MAGIC: [u8; 4] = *b"qoif";

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 14;

/// Channel count written by the encoder. Only RGBA is supported.
pub const CHANNELS: u8 = 4;

/// Colorspace flags written by the encoder.
pub const COLORSPACE: u8 = 0;

/// How the decoded pixels should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// 4 channels of 8 bits, alpha not premultiplied.
    Nrgba,
}

/// A parsed stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    /// Channel count as stored in the stream. Informational only.
    pub channels: u8,
    /// Colorspace flags as stored in the stream. Informational only.
    pub colorspace: u8,
}

impl Header {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: CHANNELS,
            colorspace: COLORSPACE,
        }
    }

    /// Decoded pixels are always non-premultiplied RGBA, whatever the channel byte says.
    pub fn color_model(&self) -> ColorModel {
        ColorModel::Nrgba
    }

    /// `width * height`, or `None` if it doesn't fit in a [usize].
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    pub(crate) fn write<W: Write>(&self, into: W) -> Result<(), std::io::Error> {
        let mut writer = ByteWriter::endian(into, BigEndian);
        writer.write_bytes(&MAGIC)?;
        writer.write(self.width)?;
        writer.write(self.height)?;
        writer.write(self.channels)?;
        writer.write(self.colorspace)?;
        Ok(())
    }

    /// Read the header. The magic is checked before anything else is consumed.
    pub(crate) fn read<R: Read>(from: R) -> Result<Self, DecodingError> {
        let mut reader = ByteReader::endian(from, BigEndian);

        let mut magic = [0; 4];
        reader.read_bytes(&mut magic).map_err(truncated)?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic(magic).into());
        }

        let width = reader.read::<u32>().map_err(truncated)?;
        let height = reader.read::<u32>().map_err(truncated)?;
        let channels = reader.read::<u8>().map_err(truncated)?;
        let colorspace = reader.read::<u8>().map_err(truncated)?;

        Ok(Self {
            width,
            height,
            channels,
            colorspace,
        })
    }
}

fn truncated(error: std::io::Error) -> DecodingError {
    match error.kind() {
        ErrorKind::UnexpectedEof => FormatError::TruncatedHeader.into(),
        _ => error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_header() -> Result<(), std::io::Error> {
        let mut output = vec![];

        Header::new(2, 1).write(&mut output)?;

        assert_eq!(
            output,
            [b'q', b'o', b'i', b'f', 0, 0, 0, 2, 0, 0, 0, 1, 4, 0]
        );

        Ok(())
    }

    #[test]
    fn read_header() {
        let input = [
            b'q', b'o', b'i', b'f', 0, 0, 0x01, 0x00, 0, 0, 0, 0x30, 3, 1,
        ];

        let header = Header::read(&input[..]).unwrap();

        assert_eq!(header.width, 256);
        assert_eq!(header.height, 48);
        assert_eq!(header.channels, 3);
        assert_eq!(header.colorspace, 1);
        assert_eq!(header.color_model(), ColorModel::Nrgba);
        assert_eq!(header.pixel_count(), Some(256 * 48));
    }

    #[test]
    fn bad_magic_stops_after_four_bytes() {
        let input = [b'q', b'o', b'i', b'x', 0, 0, 0, 2, 0, 0, 0, 1, 4, 0];
        let mut from = &input[..];

        let error = Header::read(&mut from).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::Format(FormatError::InvalidMagic(magic)) if &magic == b"qoix"
        ));
        assert_eq!(from.len(), input.len() - 4);
    }

    #[test]
    fn short_header_is_a_format_error() {
        let input = [b'q', b'o', b'i', b'f', 0, 0, 0, 2, 0];

        let error = Header::read(&input[..]).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::Format(FormatError::TruncatedHeader)
        ));
    }

    #[test]
    fn empty_input_is_a_format_error() {
        let error = Header::read(&[][..]).unwrap_err();

        assert!(matches!(
            error,
            DecodingError::Format(FormatError::TruncatedHeader)
        ));
    }
}
