
use std::vec::Vec;

/// Data that compresses well but is not trivially repetitive.
pub(crate) fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 ^ (i / 1000) as u8).collect()
}
