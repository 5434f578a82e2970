//! Walking the blocks of a frame to find where it ends, without decoding them.

use crate::common::{BLOCK_HEADER_SIZE, CONTENT_CHECKSUM_SIZE, MAX_BLOCK_SIZE};
use crate::decoding::byte_reader::ByteReader;
use crate::decoding::errors::ReadBlockHeaderError;
use crate::decoding::frame::FrameHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Raw,
    RLE,
    Compressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub last_block: bool,
    pub block_type: BlockType,
    /// The `Block_Size` field. For RLE blocks this is the regenerated size.
    pub decompressed_size: u32,
    /// How many bytes of block content follow the header.
    pub content_size: u32,
}

pub fn read_block_header(r: &mut ByteReader<'_>) -> Result<BlockHeader, ReadBlockHeaderError> {
    let raw = r
        .read_le(BLOCK_HEADER_SIZE)
        .map_err(ReadBlockHeaderError::BlockHeaderReadError)? as u32;

    let last_block = raw & 0x1 == 1;
    let block_type = match (raw >> 1) & 0x3 {
        0 => BlockType::Raw,
        1 => BlockType::RLE,
        2 => BlockType::Compressed,
        _ => return Err(ReadBlockHeaderError::FoundReservedBlock),
    };

    let block_size = raw >> 3;
    if block_size > MAX_BLOCK_SIZE {
        return Err(ReadBlockHeaderError::BlockTooBig {
            got: block_size,
            max: MAX_BLOCK_SIZE,
        });
    }

    let content_size = match block_type {
        BlockType::RLE => 1,
        _ => block_size,
    };

    Ok(BlockHeader {
        last_block,
        block_type,
        decompressed_size: block_size,
        content_size,
    })
}

/// Skips all blocks of the frame described by `header`, plus its checksum if
/// it has one. Returns the number of bytes consumed.
pub fn skip_frame_body(
    r: &mut ByteReader<'_>,
    header: &FrameHeader,
) -> Result<usize, ReadBlockHeaderError> {
    let start = r.position();
    loop {
        let block_header = read_block_header(r)?;
        r.skip(block_header.content_size as usize)
            .map_err(ReadBlockHeaderError::BlockContentReadError)?;
        if block_header.last_block {
            break;
        }
    }

    if header.descriptor.content_checksum_flag() {
        r.skip(CONTENT_CHECKSUM_SIZE)
            .map_err(ReadBlockHeaderError::ChecksumReadError)?;
    }

    Ok(r.position() - start)
}
