//! Summing the declared content sizes of all frames in a buffer.
//!
//! Only headers are parsed. The blocks of a frame are walked to find where the
//! next frame starts, but never decoded. A frame without a content size ends
//! the scan before its blocks are looked at.

use crate::common::{is_frame_magic, SKIPPABLE_HEADER_SIZE};
use crate::decoding::block::skip_frame_body;
use crate::decoding::byte_reader::ByteReader;
use crate::decoding::errors::ScanError;
use crate::decoding::frame::{read_frame_header, FrameHeader, FrameStart};

/// The decompressed size of a buffer, as far as its frame headers tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSize {
    /// Sum of the content sizes declared by all frames.
    Known(u64),
    /// At least one frame does not declare its content size.
    Unknown,
}

impl ContentSize {
    pub fn known(self) -> Option<u64> {
        match self {
            ContentSize::Known(size) => Some(size),
            ContentSize::Unknown => None,
        }
    }
}

/// A frame found while scanning, along with the offset its magic number starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Skippable {
        offset: usize,
        magic_number: u32,
        length: u32,
    },
    Standard {
        offset: usize,
        header: FrameHeader,
    },
}

impl Frame {
    pub fn offset(&self) -> usize {
        match self {
            Frame::Skippable { offset, .. } | Frame::Standard { offset, .. } => *offset,
        }
    }
}

/// Iterator over the frames in a buffer, see [`frames`].
#[derive(Debug, Clone)]
pub struct Frames<'s> {
    reader: ByteReader<'s>,
    /// Offset and header of the last zstd frame, whose body has not been skipped yet.
    pending_body: Option<(usize, FrameHeader)>,
    done: bool,
}

/// Iterates the frames of `source` in order.
///
/// Skippable frames are stepped over using their declared length. The body of
/// a zstd frame is skipped when the next item is requested: if the header is
/// directly followed by another magic number the frame has no body in this
/// buffer, otherwise its blocks are walked to their end. A body that can not
/// be walked is reported as an error. After an error no further items are
/// produced.
pub fn frames(source: &[u8]) -> Frames<'_> {
    Frames {
        reader: ByteReader::new(source),
        pending_body: None,
        done: false,
    }
}

impl<'s> Frames<'s> {
    fn next_frame(&mut self) -> Result<Frame, ScanError> {
        let offset = self.reader.position();
        let start = read_frame_header(&mut self.reader)
            .map_err(|source| ScanError::InvalidFrameHeader { offset, source })?;

        match start {
            FrameStart::Skippable {
                magic_number,
                length,
            } => {
                let remaining = self.reader.remaining();
                self.reader.skip(length as usize).map_err(|_| {
                    ScanError::SkippableFrameTruncated {
                        offset,
                        declared: length,
                        remaining,
                    }
                })?;
                debug_assert_eq!(
                    self.reader.position() - offset,
                    SKIPPABLE_HEADER_SIZE + length as usize
                );
                Ok(Frame::Skippable {
                    offset,
                    magic_number,
                    length,
                })
            }
            FrameStart::Standard(header) => {
                self.pending_body = Some((offset, header.clone()));
                Ok(Frame::Standard { offset, header })
            }
        }
    }

    fn skip_body(&mut self, offset: usize, header: &FrameHeader) -> Result<(), ScanError> {
        if self.reader.is_empty() {
            return Ok(());
        }
        if let Some(magic) = self.reader.peek_u32_le() {
            if is_frame_magic(magic) {
                return Ok(());
            }
        }
        skip_frame_body(&mut self.reader, header)
            .map(|_| ())
            .map_err(|source| ScanError::InvalidFrameBody { offset, source })
    }
}

impl<'s> Iterator for Frames<'s> {
    type Item = Result<Frame, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some((offset, header)) = self.pending_body.take() {
            if let Err(err) = self.skip_body(offset, &header) {
                self.done = true;
                return Some(Err(err));
            }
        }
        if self.reader.is_empty() {
            return None;
        }
        let frame = self.next_frame();
        if frame.is_err() {
            self.done = true;
        }
        Some(frame)
    }
}

/// Finds the decompressed size of `source` from the frame headers alone.
///
/// Returns `ContentSize::Unknown` as soon as a frame without a declared
/// content size is found. An empty buffer, a buffer holding nothing but
/// skippable frames and a total that does not fit in a u64 are errors.
pub fn scan(source: &[u8]) -> Result<ContentSize, ScanError> {
    if source.is_empty() {
        return Err(ScanError::EmptyInput);
    }

    let mut total: Option<u64> = None;
    for frame in frames(source) {
        let (offset, header) = match frame? {
            Frame::Skippable { .. } => continue,
            Frame::Standard { offset, header } => (offset, header),
        };

        let frame_size = match header.frame_content_size() {
            Some(size) => size,
            None => return Ok(ContentSize::Unknown),
        };

        let sum = total.unwrap_or(0);
        total = Some(
            sum.checked_add(frame_size)
                .ok_or(ScanError::ContentSizeOverflow {
                    offset,
                    total: sum,
                    frame_size,
                })?,
        );
    }

    total.map(ContentSize::Known).ok_or(ScanError::NoSizedFrame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MAGIC_NUM, MAX_BLOCK_SIZE};
    use crate::decoding::errors::{ReadBlockHeaderError, ReadFrameHeaderError};
    use alloc::vec::Vec;

    fn standard(descriptor: u8, rest: &[u8]) -> Vec<u8> {
        let mut v = MAGIC_NUM.to_le_bytes().to_vec();
        v.push(descriptor);
        v.extend_from_slice(rest);
        v
    }

    fn skippable(magic_number: u32, payload: &[u8]) -> Vec<u8> {
        let mut v = magic_number.to_le_bytes().to_vec();
        v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        v.extend_from_slice(payload);
        v
    }

    /// A single last raw block carrying `payload`.
    fn raw_block(payload: &[u8]) -> Vec<u8> {
        let raw = ((payload.len() as u32) << 3) | 0x1;
        let mut v = raw.to_le_bytes()[..3].to_vec();
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn two_byte_content_size() {
        let data = standard(0x40, &[0x00, 0x00, 0x01]);
        assert_eq!(scan(&data), Ok(ContentSize::Known(256)));
    }

    #[test]
    fn wide_content_sizes() {
        let data = standard(0xA0, &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(scan(&data), Ok(ContentSize::Known(0xDEAD_BEEF)));

        let data = standard(0xE0, &u64::MAX.to_le_bytes());
        assert_eq!(scan(&data), Ok(ContentSize::Known(u64::MAX)));

        let data = standard(0x60, &[0x34, 0x12]);
        assert_eq!(scan(&data), Ok(ContentSize::Known(0x1234)));
    }

    #[test]
    fn single_segment_single_byte() {
        assert_eq!(scan(&standard(0x20, &[0])), Ok(ContentSize::Known(256)));
        assert_eq!(scan(&standard(0x20, &[255])), Ok(ContentSize::Known(511)));
    }

    #[test]
    fn missing_content_size_is_unknown() {
        let data = standard(0x00, &[0x00]);
        assert_eq!(scan(&data), Ok(ContentSize::Unknown));
        assert_eq!(ContentSize::Unknown.known(), None);
    }

    #[test]
    fn unknown_short_circuits() {
        // Garbage after an unknown frame is never looked at
        let mut data = standard(0x00, &[0x00]);
        data.extend_from_slice(&standard(0x00, &[0x00]));
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(scan(&data), Ok(ContentSize::Unknown));
    }

    #[test]
    fn reserved_and_checksum_bits_do_not_matter() {
        let data = standard(0x4C, &[0x00, 0x10, 0x00]);
        assert_eq!(scan(&data), Ok(ContentSize::Known(16)));
    }

    #[test]
    fn dictionary_id_is_skipped() {
        let data = standard(0x63, &[1, 2, 3, 4, 0x00, 0x02]);
        assert_eq!(scan(&data), Ok(ContentSize::Known(512)));
    }

    #[test]
    fn empty_input() {
        assert_eq!(scan(&[]), Err(ScanError::EmptyInput));
        assert_eq!(frames(&[]).next(), None);
    }

    #[test]
    fn bad_magic() {
        assert_eq!(
            scan(&[0x28, 0xB5, 0x2F, 0xFC, 0x40, 0x00, 0x01]),
            Err(ScanError::InvalidFrameHeader {
                offset: 0,
                source: ReadFrameHeaderError::BadMagicNumber(0xFC2F_B528)
            })
        );
        assert!(scan(&[0x28, 0xB5, 0x2F]).is_err());
    }

    #[test]
    fn truncated_header() {
        let full = standard(0xC0, &[0x00, 1, 2, 3, 4, 5, 6, 7, 8]);
        for len in 1..full.len() {
            assert!(
                matches!(scan(&full[..len]), Err(ScanError::InvalidFrameHeader { .. })),
                "len {}",
                len
            );
        }
        assert!(scan(&full).is_ok());
    }

    #[test]
    fn only_skippable_frames() {
        let mut data = skippable(0x184D_2A50, &[1, 2, 3]);
        data.extend_from_slice(&skippable(0x184D_2A5F, &[4; 10]));
        assert_eq!(data.len(), 8 + 3 + 8 + 10);

        let found: Result<Vec<_>, _> = frames(&data).collect();
        let found = found.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].offset(), 11);
        assert_eq!(scan(&data), Err(ScanError::NoSizedFrame));
    }

    #[test]
    fn skippable_frames_around_a_zstd_frame() {
        let mut data = skippable(0x184D_2A55, &[0xFF; 5]);
        data.extend_from_slice(&standard(0x80, &[0x00, 0x10, 0x27, 0x00, 0x00]));
        data.extend_from_slice(&skippable(0x184D_2A55, &[]));
        assert_eq!(scan(&data), Ok(ContentSize::Known(10_000)));
    }

    #[test]
    fn truncated_skippable_frame() {
        let mut data = skippable(0x184D_2A50, &[0; 6]);
        data.truncate(data.len() - 1);
        assert_eq!(
            scan(&data),
            Err(ScanError::SkippableFrameTruncated {
                offset: 0,
                declared: 6,
                remaining: 5
            })
        );
    }

    #[test]
    fn header_only_frames_are_summed() {
        let mut data = standard(0x60, &[0x10, 0x00]);
        data.extend_from_slice(&standard(0x60, &[0x20, 0x00]));
        assert_eq!(scan(&data), Ok(ContentSize::Known(0x30)));
    }

    #[test]
    fn frames_with_bodies_are_summed() {
        let mut data = standard(0x60, &[0x03, 0x00]);
        data.extend_from_slice(&raw_block(b"abc"));
        data.extend_from_slice(&standard(0x64, &[0x02, 0x00]));
        data.extend_from_slice(&raw_block(b"de"));
        data.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        data.extend_from_slice(&skippable(0x184D_2A51, &[0; 2]));
        data.extend_from_slice(&standard(0x60, &[0x00, 0x00]));
        data.extend_from_slice(&raw_block(b""));
        assert_eq!(scan(&data), Ok(ContentSize::Known(5)));

        let offsets: Vec<usize> = frames(&data).map(|f| f.unwrap().offset()).collect();
        assert_eq!(offsets, [0, 13, 29, 39]);
    }

    fn body_error(data: &[u8]) -> ReadBlockHeaderError {
        match scan(data) {
            Err(ScanError::InvalidFrameBody { offset: 0, source }) => source,
            other => panic!("expected a body error for the first frame, got {:?}", other),
        }
    }

    #[test]
    fn broken_bodies_are_errors() {
        let header = standard(0x20, &[0x05]);
        let with_body = |body: &[u8]| {
            let mut data = header.clone();
            data.extend_from_slice(body);
            data
        };

        assert_eq!(
            body_error(&with_body(&[0x07, 0x00, 0x00])),
            ReadBlockHeaderError::FoundReservedBlock
        );
        assert_eq!(
            body_error(&with_body(&[0xFF, 0xFF, 0xFF])),
            ReadBlockHeaderError::FoundReservedBlock
        );
        // a raw block declaring 10 bytes with only 2 present
        assert!(matches!(
            body_error(&with_body(&[0x51, 0x00, 0x00, 0xAA, 0xBB])),
            ReadBlockHeaderError::BlockContentReadError(_)
        ));
        assert!(matches!(
            body_error(&with_body(&[0xAB, 0xCD])),
            ReadBlockHeaderError::BlockHeaderReadError(_)
        ));
        // a raw block bigger than the format allows
        let too_big = ((MAX_BLOCK_SIZE + 1) << 3) | 0x1;
        assert!(matches!(
            body_error(&with_body(&too_big.to_le_bytes()[..3])),
            ReadBlockHeaderError::BlockTooBig { .. }
        ));
    }

    #[test]
    fn missing_checksum_is_an_error() {
        let mut data = standard(0x64, &[0x03, 0x00]);
        data.extend_from_slice(&raw_block(b"abc"));
        data.extend_from_slice(&[0x11, 0x22]);
        assert!(matches!(
            body_error(&data),
            ReadBlockHeaderError::ChecksumReadError(_)
        ));
    }

    #[test]
    fn body_errors_report_the_frame_offset() {
        let mut data = skippable(0x184D_2A50, &[]);
        data.extend_from_slice(&standard(0x20, &[0x05]));
        data.extend_from_slice(&[0x07, 0x00, 0x00]);
        assert_eq!(
            scan(&data),
            Err(ScanError::InvalidFrameBody {
                offset: 8,
                source: ReadBlockHeaderError::FoundReservedBlock
            })
        );

        let mut iter = frames(&data);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn unknown_frame_body_is_not_walked() {
        let mut data = standard(0x00, &[0x00]);
        data.extend_from_slice(&[0x07, 0x00, 0x00]);
        assert_eq!(scan(&data), Ok(ContentSize::Unknown));
    }

    #[test]
    fn garbage_after_a_located_frame_is_an_error() {
        let mut data = standard(0x60, &[0x10, 0x00]);
        data.extend_from_slice(&raw_block(b"x"));
        data.extend_from_slice(&[1, 2, 3, 4]);
        assert!(matches!(
            scan(&data),
            Err(ScanError::InvalidFrameHeader { offset: 11, .. })
        ));
    }

    #[test]
    fn overflow() {
        let mut data = standard(0xE0, &u64::MAX.to_le_bytes());
        data.extend_from_slice(&standard(0x20, &[0]));
        assert_eq!(
            scan(&data),
            Err(ScanError::ContentSizeOverflow {
                offset: 13,
                total: u64::MAX,
                frame_size: 256
            })
        );

        let mut data = standard(0xE0, &(u64::MAX - 1).to_le_bytes());
        data.extend_from_slice(&standard(0x60, &[1, 0]));
        assert_eq!(scan(&data), Ok(ContentSize::Known(u64::MAX)));
    }

    #[test]
    fn iteration_ends_after_an_error() {
        let mut data = skippable(0x184D_2A50, &[]);
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        let mut iter = frames(&data);
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert_eq!(iter.next(), None);
    }
}
