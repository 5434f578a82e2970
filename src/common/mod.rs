//! Constants of the zstd frame format that the scanner depends on.

// --- FRAMES ---
/// This magic number is included at the start of a single Zstandard frame
pub const MAGIC_NUM: u32 = 0xFD2F_B528;
/// Skippable frames have a magic number in this interval.
///
/// The low nibble is free for the user, the payload is never interpreted.
pub const SKIPPABLE_MAGIC_RANGE: core::ops::RangeInclusive<u32> = 0x184D_2A50..=0x184D_2A5F;
/// Magic number plus the 4 byte payload length.
pub const SKIPPABLE_HEADER_SIZE: usize = 8;
/// A 1 byte `Frame_Content_Size` only appears in single segment frames and is
/// stored with this offset subtracted.
pub const SINGLE_BYTE_CONTENT_SIZE_OFFSET: u64 = 256;

// --- BLOCKS ---
/// Every block starts with a 3 byte header
pub const BLOCK_HEADER_SIZE: usize = 3;
/// Blocks cannot be larger than 128KB in size.
pub const MAX_BLOCK_SIZE: u32 = 128 * 1024;
/// Size of the optional `Content_Checksum` that trails the last block.
pub const CONTENT_CHECKSUM_SIZE: usize = 4;

/// Returns true if `magic` starts either a zstd frame or a skippable frame.
pub fn is_frame_magic(magic: u32) -> bool {
    magic == MAGIC_NUM || SKIPPABLE_MAGIC_RANGE.contains(&magic)
}
