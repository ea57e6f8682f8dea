//! Chunk tags and the bit layout of every chunk kind.
//!
//! All fields are packed most significant bit first, so a chunk is the concatenation of its
//! fields in the order they are listed here:
//!
//! | Chunk  | Fields                                   | Size        |
//! |--------|------------------------------------------|-------------|
//! | Index  | `00` + 6 bit slot                        | 1 byte      |
//! | Run8   | `010` + 5 bit run - 1                    | 1 byte      |
//! | Run16  | `011` + 13 bit run - 33                  | 2 bytes     |
//! | Diff8  | `10` + r, g, b as 2 bits, bias 2         | 1 byte      |
//! | Diff16 | `110` + r 5 bits bias 16, g, b 4 bits bias 8 | 2 bytes |
//! | Diff24 | `1110` + r, g, b, a as 5 bits, bias 16   | 3 bytes     |
//! | Color  | `1111` + r, g, b, a presence bits + one byte per set bit | 1 to 5 bytes |

use std::io;

use bitstream_io::{BitRead, BitWrite};

pub(crate) const INDEX: u8 = 0b0000_0000;
pub(crate) const RUN_8: u8 = 0b0100_0000;
pub(crate) const RUN_16: u8 = 0b0110_0000;
pub(crate) const DIFF_8: u8 = 0b1000_0000;
pub(crate) const DIFF_16: u8 = 0b1100_0000;
pub(crate) const DIFF_24: u8 = 0b1110_0000;
pub(crate) const COLOR: u8 = 0b1111_0000;

pub(crate) const MASK_2: u8 = 0b1100_0000;
pub(crate) const MASK_3: u8 = 0b1110_0000;
pub(crate) const MASK_4: u8 = 0b1111_0000;

/// Longest run a single run chunk can hold.
pub const MAX_RUN: u16 = 0x2020;

/// Longest run that fits in a one byte run chunk.
const MAX_SHORT_RUN: u16 = 32;

/// The kind of chunk announced by the first byte of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Index,
    Run8,
    Run16,
    Diff8,
    Diff16,
    Diff24,
    Color,
}

impl Tag {
    /// Classify a tag byte, trying the widest masks first.
    #[inline]
    pub(crate) fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            b if b & MASK_4 == COLOR => Some(Tag::Color),
            b if b & MASK_4 == DIFF_24 => Some(Tag::Diff24),
            b if b & MASK_3 == DIFF_16 => Some(Tag::Diff16),
            b if b & MASK_3 == RUN_16 => Some(Tag::Run16),
            b if b & MASK_3 == RUN_8 => Some(Tag::Run8),
            b if b & MASK_2 == DIFF_8 => Some(Tag::Diff8),
            b if b & MASK_2 == INDEX => Some(Tag::Index),
            _ => None,
        }
    }
}

/// One unit of the chunk stream. Deltas are unbiased, runs hold their full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chunk {
    Index(u8),
    Run(u16),
    Diff8 { r: i8, g: i8, b: i8 },
    Diff16 { r: i8, g: i8, b: i8 },
    Diff24 { r: i8, g: i8, b: i8, a: i8 },
    /// New values for the channels that changed, in r, g, b, a order.
    Color([Option<u8>; 4]),
}

impl Chunk {
    pub(crate) fn tag(&self) -> Tag {
        match self {
            Chunk::Index(_) => Tag::Index,
            Chunk::Run(run) if *run <= MAX_SHORT_RUN => Tag::Run8,
            Chunk::Run(_) => Tag::Run16,
            Chunk::Diff8 { .. } => Tag::Diff8,
            Chunk::Diff16 { .. } => Tag::Diff16,
            Chunk::Diff24 { .. } => Tag::Diff24,
            Chunk::Color(_) => Tag::Color,
        }
    }

    /// Size of the chunk once written, in bytes.
    pub(crate) fn encoded_len(&self) -> usize {
        match self.tag() {
            Tag::Index | Tag::Run8 | Tag::Diff8 => 1,
            Tag::Run16 | Tag::Diff16 => 2,
            Tag::Diff24 => 3,
            Tag::Color => match self {
                Chunk::Color(channels) => 1 + channels.iter().flatten().count(),
                _ => 1,
            },
        }
    }

    pub(crate) fn write<W: BitWrite>(&self, out: &mut W) -> io::Result<()> {
        match *self {
            Chunk::Index(index) => {
                out.write(2, INDEX >> 6)?;
                out.write(6, index & 0x3f)?;
            }
            Chunk::Run(run) if run <= MAX_SHORT_RUN => {
                out.write(3, RUN_8 >> 5)?;
                out.write(5, (run - 1) as u8)?;
            }
            Chunk::Run(run) => {
                out.write(3, RUN_16 >> 5)?;
                out.write(13, run - (MAX_SHORT_RUN + 1))?;
            }
            Chunk::Diff8 { r, g, b } => {
                out.write(2, DIFF_8 >> 6)?;
                out.write(2, (r + 2) as u8)?;
                out.write(2, (g + 2) as u8)?;
                out.write(2, (b + 2) as u8)?;
            }
            Chunk::Diff16 { r, g, b } => {
                out.write(3, DIFF_16 >> 5)?;
                out.write(5, (r + 16) as u8)?;
                out.write(4, (g + 8) as u8)?;
                out.write(4, (b + 8) as u8)?;
            }
            Chunk::Diff24 { r, g, b, a } => {
                out.write(4, DIFF_24 >> 4)?;
                out.write(5, (r + 16) as u8)?;
                out.write(5, (g + 16) as u8)?;
                out.write(5, (b + 16) as u8)?;
                out.write(5, (a + 16) as u8)?;
            }
            Chunk::Color(channels) => {
                out.write(4, COLOR >> 4)?;
                for channel in channels {
                    out.write_bit(channel.is_some())?;
                }
                for value in channels.into_iter().flatten() {
                    out.write(8, value)?;
                }
            }
        }

        Ok(())
    }

    /// Read the rest of a chunk whose first byte, `byte`, was classified as `tag`.
    pub(crate) fn read<R: BitRead>(tag: Tag, byte: u8, from: &mut R) -> io::Result<Chunk> {
        let chunk = match tag {
            Tag::Index => Chunk::Index(byte & 0x3f),
            Tag::Run8 => Chunk::Run((byte & 0x1f) as u16 + 1),
            Tag::Run16 => {
                let low = from.read::<u16>(8)?;
                Chunk::Run((((byte & 0x1f) as u16) << 8 | low) + MAX_SHORT_RUN + 1)
            }
            Tag::Diff8 => Chunk::Diff8 {
                r: ((byte >> 4) & 0x03) as i8 - 2,
                g: ((byte >> 2) & 0x03) as i8 - 2,
                b: (byte & 0x03) as i8 - 2,
            },
            Tag::Diff16 => {
                let g = from.read::<u8>(4)?;
                let b = from.read::<u8>(4)?;
                Chunk::Diff16 {
                    r: (byte & 0x1f) as i8 - 16,
                    g: g as i8 - 8,
                    b: b as i8 - 8,
                }
            }
            Tag::Diff24 => {
                let rest = from.read::<u32>(16)?;
                let bits = ((byte & 0x0f) as u32) << 16 | rest;
                let field = |shift: u32| ((bits >> shift) & 0x1f) as i8 - 16;
                Chunk::Diff24 {
                    r: field(15),
                    g: field(10),
                    b: field(5),
                    a: field(0),
                }
            }
            Tag::Color => {
                let mut channels = [None; 4];
                for (position, channel) in channels.iter_mut().enumerate() {
                    if byte & (0b1000 >> position) != 0 {
                        *channel = Some(from.read::<u8>(8)?);
                    }
                }
                Chunk::Color(channels)
            }
        };

        Ok(chunk)
    }
}

/// How many chunks of each kind a pass produced or consumed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkCounts {
    pub(crate) index: usize,
    pub(crate) run: usize,
    pub(crate) diff: usize,
    pub(crate) color: usize,
}

impl ChunkCounts {
    pub(crate) fn record(&mut self, chunk: &Chunk) {
        match chunk {
            Chunk::Index(_) => self.index += 1,
            Chunk::Run(_) => self.run += 1,
            Chunk::Diff8 { .. } | Chunk::Diff16 { .. } | Chunk::Diff24 { .. } => self.diff += 1,
            Chunk::Color(_) => self.color += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.index + self.run + self.diff + self.color
    }
}

#[cfg(test)]
mod tests {
    use bitstream_io::{BigEndian, BitReader, BitWriter};

    use super::*;

    fn written(chunk: Chunk) -> Result<Vec<u8>, io::Error> {
        let mut output = vec![];
        let mut writer = BitWriter::endian(&mut output, BigEndian);
        chunk.write(&mut writer)?;
        assert!(writer.byte_aligned());
        drop(writer);
        Ok(output)
    }

    fn read_back(bytes: &[u8]) -> Result<Chunk, io::Error> {
        let tag = Tag::from_byte(bytes[0]).expect("unclassified tag");
        let mut reader = BitReader::endian(&bytes[1..], BigEndian);
        Chunk::read(tag, bytes[0], &mut reader)
    }

    #[test]
    fn every_tag_byte_is_classified() {
        for byte in 0..=u8::MAX {
            assert!(Tag::from_byte(byte).is_some(), "tag {byte:#04x}");
        }
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(Tag::from_byte(0x00), Some(Tag::Index));
        assert_eq!(Tag::from_byte(0x3f), Some(Tag::Index));
        assert_eq!(Tag::from_byte(0x40), Some(Tag::Run8));
        assert_eq!(Tag::from_byte(0x5f), Some(Tag::Run8));
        assert_eq!(Tag::from_byte(0x60), Some(Tag::Run16));
        assert_eq!(Tag::from_byte(0x7f), Some(Tag::Run16));
        assert_eq!(Tag::from_byte(0x80), Some(Tag::Diff8));
        assert_eq!(Tag::from_byte(0xbf), Some(Tag::Diff8));
        assert_eq!(Tag::from_byte(0xc0), Some(Tag::Diff16));
        assert_eq!(Tag::from_byte(0xdf), Some(Tag::Diff16));
        assert_eq!(Tag::from_byte(0xe0), Some(Tag::Diff24));
        assert_eq!(Tag::from_byte(0xef), Some(Tag::Diff24));
        assert_eq!(Tag::from_byte(0xf0), Some(Tag::Color));
        assert_eq!(Tag::from_byte(0xff), Some(Tag::Color));
    }

    #[test]
    fn write_runs() -> Result<(), io::Error> {
        assert_eq!(written(Chunk::Run(1))?, [0x40]);
        assert_eq!(written(Chunk::Run(32))?, [0x5f]);
        assert_eq!(written(Chunk::Run(33))?, [0x60, 0x00]);
        assert_eq!(written(Chunk::Run(MAX_RUN))?, [0x7f, 0xff]);

        Ok(())
    }

    #[test]
    fn write_index() -> Result<(), io::Error> {
        assert_eq!(written(Chunk::Index(53))?, [0x35]);

        Ok(())
    }

    #[test]
    fn write_diffs() -> Result<(), io::Error> {
        assert_eq!(written(Chunk::Diff8 { r: -2, g: 0, b: 1 })?, [0b10_00_10_11]);
        assert_eq!(
            written(Chunk::Diff16 { r: 15, g: 0, b: 0 })?,
            [0xdf, 0x88]
        );
        assert_eq!(
            written(Chunk::Diff24 {
                r: 0,
                g: 0,
                b: 0,
                a: -16
            })?,
            [0xe8, 0x42, 0x00]
        );

        Ok(())
    }

    #[test]
    fn write_color_only_changed_channels() -> Result<(), io::Error> {
        let chunk = Chunk::Color([Some(10), None, Some(30), None]);

        assert_eq!(written(chunk)?, [0xfa, 10, 30]);
        assert_eq!(chunk.encoded_len(), 3);

        Ok(())
    }

    #[test]
    fn read_what_was_written() -> Result<(), io::Error> {
        let chunks = [
            Chunk::Index(63),
            Chunk::Run(7),
            Chunk::Run(4000),
            Chunk::Diff8 { r: 1, g: -1, b: 0 },
            Chunk::Diff16 { r: -16, g: 7, b: -8 },
            Chunk::Diff24 {
                r: 15,
                g: -16,
                b: 3,
                a: -9,
            },
            Chunk::Color([None, Some(200), None, Some(0)]),
        ];

        for chunk in chunks {
            let bytes = written(chunk)?;
            assert_eq!(bytes.len(), chunk.encoded_len());
            assert_eq!(read_back(&bytes)?, chunk);
        }

        Ok(())
    }

    #[test]
    fn truncated_chunk_body_is_unexpected_eof() {
        let error = read_back(&[0xe8, 0x42]).unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn counts_group_diffs() {
        let mut counts = ChunkCounts::default();
        counts.record(&Chunk::Diff8 { r: 0, g: 0, b: 0 });
        counts.record(&Chunk::Diff24 {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        });
        counts.record(&Chunk::Run(3));

        assert_eq!(counts.diff, 2);
        assert_eq!(counts.run, 1);
        assert_eq!(counts.total(), 3);
    }
}
