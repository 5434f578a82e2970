//! Find the decompressed size of zstd compressed data without decompressing it.
//!
//! The size is the sum of the `Frame_Content_Size` fields of all frames in the
//! input. Skippable frames contribute nothing.
//!
//! ```
//! use zstd_size::ContentSize;
//!
//! // magic number, descriptor (2 byte content size, single segment), 0x1234
//! let frame = [0x28, 0xB5, 0x2F, 0xFD, 0x60, 0x34, 0x12];
//! assert_eq!(zstd_size::scan(&frame), Ok(ContentSize::Known(0x1234)));
//! ```
#![no_std]
#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

#[cfg(test)]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod common;
pub mod decoding;
#[cfg(test)]
mod tests;

pub use decoding::errors::{
    ReadBlockHeaderError, ReadFrameHeaderError, ScanError, UnexpectedEndOfInput,
};
pub use decoding::byte_reader::ByteReader;
pub use decoding::frame::{FrameDescriptor, FrameHeader};
pub use decoding::scanner::{frames, scan, ContentSize, Frame, Frames};
