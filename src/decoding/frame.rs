//! Reading the header at the start of every frame.

use crate::common::{MAGIC_NUM, SINGLE_BYTE_CONTENT_SIZE_OFFSET, SKIPPABLE_MAGIC_RANGE};
use crate::decoding::byte_reader::ByteReader;
use crate::decoding::errors::ReadFrameHeaderError;

/// The `Frame_Header_Descriptor` byte.
///
/// <https://github.com/facebook/zstd/blob/dev/doc/zstd_compression_format.md#frame_header_descriptor>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor(pub u8);

impl FrameDescriptor {
    pub fn frame_content_size_flag(&self) -> u8 {
        self.0 >> 6
    }

    pub fn single_segment_flag(&self) -> bool {
        ((self.0 >> 5) & 0x1) == 1
    }

    pub fn reserved_flag(&self) -> bool {
        ((self.0 >> 3) & 0x1) == 1
    }

    pub fn content_checksum_flag(&self) -> bool {
        ((self.0 >> 2) & 0x1) == 1
    }

    pub fn dict_id_flag(&self) -> u8 {
        self.0 & 0x3
    }

    // Deriving info from the flags
    pub fn frame_content_size_bytes(&self) -> u8 {
        match self.frame_content_size_flag() {
            0 => {
                if self.single_segment_flag() {
                    1
                } else {
                    0
                }
            }
            1 => 2,
            2 => 4,
            _ => 8,
        }
    }

    pub fn dictionary_id_bytes(&self) -> u8 {
        match self.dict_id_flag() {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub descriptor: FrameDescriptor,
    window_descriptor: Option<u8>,
    dict_id: Option<u32>,
    frame_content_size: Option<u64>,
    header_size: u8,
}

impl FrameHeader {
    /// The raw `Window_Descriptor`, absent in single segment frames.
    pub fn window_descriptor(&self) -> Option<u8> {
        self.window_descriptor
    }

    /// A dictionary id of zero means "no dictionary" and is reported as `None`.
    pub fn dictionary_id(&self) -> Option<u32> {
        self.dict_id
    }

    /// The declared decompressed size, `None` if the header does not carry one.
    pub fn frame_content_size(&self) -> Option<u64> {
        self.frame_content_size
    }

    /// Number of bytes the header occupies, magic number included.
    pub fn header_size(&self) -> u8 {
        self.header_size
    }
}

/// What the magic number at the start of a frame announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStart {
    Skippable { magic_number: u32, length: u32 },
    Standard(FrameHeader),
}

/// Reads either the complete header of a zstd frame or the 8 byte header of a
/// skippable frame. The reader is left positioned right after the header.
pub fn read_frame_header(r: &mut ByteReader<'_>) -> Result<FrameStart, ReadFrameHeaderError> {
    use ReadFrameHeaderError as err;

    let magic_num = r.read_u32_le().map_err(err::MagicNumberReadError)?;
    let mut bytes_read = 4;

    if SKIPPABLE_MAGIC_RANGE.contains(&magic_num) {
        let length = r
            .read_u32_le()
            .map_err(err::SkippableFrameLengthReadError)?;
        return Ok(FrameStart::Skippable {
            magic_number: magic_num,
            length,
        });
    }

    if magic_num != MAGIC_NUM {
        return Err(err::BadMagicNumber(magic_num));
    }

    let desc = FrameDescriptor(r.read_u8().map_err(err::FrameDescriptorReadError)?);
    bytes_read += 1;

    let mut frame_header = FrameHeader {
        descriptor: desc,
        window_descriptor: None,
        dict_id: None,
        frame_content_size: None,
        header_size: 0,
    };

    if !desc.single_segment_flag() {
        frame_header.window_descriptor =
            Some(r.read_u8().map_err(err::WindowDescriptorReadError)?);
        bytes_read += 1;
    }

    let dict_id_len = desc.dictionary_id_bytes() as usize;
    if dict_id_len != 0 {
        let dict_id = r
            .read_le(dict_id_len)
            .map_err(err::DictionaryIdReadError)? as u32;
        bytes_read += dict_id_len;
        if dict_id != 0 {
            frame_header.dict_id = Some(dict_id);
        }
    }

    let fcs_len = desc.frame_content_size_bytes() as usize;
    if fcs_len != 0 {
        let mut fcs = r
            .read_le(fcs_len)
            .map_err(err::FrameContentSizeReadError)?;
        bytes_read += fcs_len;
        if fcs_len == 1 {
            fcs += SINGLE_BYTE_CONTENT_SIZE_OFFSET;
        }
        frame_header.frame_content_size = Some(fcs);
    }

    // at most 4 + 1 + 1 + 4 + 8
    frame_header.header_size = bytes_read as u8;
    Ok(FrameStart::Standard(frame_header))
}
