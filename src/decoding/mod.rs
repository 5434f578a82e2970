//! Structures and utilities used for reading zstd frame metadata

pub mod block;
pub mod byte_reader;
pub mod errors;
pub mod frame;
pub mod scanner;
