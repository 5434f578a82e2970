//! Errors that might occur while scanning zstd frame metadata.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unexpected end of input: needed {needed} bytes but only {remaining} remain")]
pub struct UnexpectedEndOfInput {
    pub needed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ReadFrameHeaderError {
    #[error("Error while reading magic number: {0}")]
    MagicNumberReadError(#[source] UnexpectedEndOfInput),
    #[error("Read wrong magic number: 0x{0:X}")]
    BadMagicNumber(u32),
    #[error("Error while reading skippable frame length: {0}")]
    SkippableFrameLengthReadError(#[source] UnexpectedEndOfInput),
    #[error("Error while reading frame descriptor: {0}")]
    FrameDescriptorReadError(#[source] UnexpectedEndOfInput),
    #[error("Error while reading window descriptor: {0}")]
    WindowDescriptorReadError(#[source] UnexpectedEndOfInput),
    #[error("Error while reading dictionary id: {0}")]
    DictionaryIdReadError(#[source] UnexpectedEndOfInput),
    #[error("Error while reading frame content size: {0}")]
    FrameContentSizeReadError(#[source] UnexpectedEndOfInput),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ReadBlockHeaderError {
    #[error("Error while reading the block header: {0}")]
    BlockHeaderReadError(#[source] UnexpectedEndOfInput),
    #[error("Reserved block occured. This is considered corruption by the documentation")]
    FoundReservedBlock,
    #[error("Block size is too big. Is: {got}, Should be at most: {max}")]
    BlockTooBig { got: u32, max: u32 },
    #[error("Error while skipping the block content: {0}")]
    BlockContentReadError(#[source] UnexpectedEndOfInput),
    #[error("Error while skipping the content checksum: {0}")]
    ChecksumReadError(#[source] UnexpectedEndOfInput),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Input is empty and contains no frames")]
    EmptyInput,
    #[error("Invalid frame header at offset {offset}: {source}")]
    InvalidFrameHeader {
        offset: usize,
        #[source]
        source: ReadFrameHeaderError,
    },
    #[error("Invalid body in frame at offset {offset}: {source}")]
    InvalidFrameBody {
        offset: usize,
        #[source]
        source: ReadBlockHeaderError,
    },
    #[error("Skippable frame at offset {offset} declares {declared} bytes of payload, but only {remaining} remain")]
    SkippableFrameTruncated {
        offset: usize,
        declared: u32,
        remaining: usize,
    },
    #[error("Frame content size {frame_size} at offset {offset} overflows the running total {total}")]
    ContentSizeOverflow {
        offset: usize,
        total: u64,
        frame_size: u64,
    },
    #[error("Input only contains skippable frames, no frame declares a content size")]
    NoSizedFrame,
}
