//! Endian-aware binary cursors shared by every format codec
//!
//! [`BinaryReader`] borrows the input slice and resolves byte order at runtime,
//! since most formats only reveal their endianness through a byte-order mark.
//! [`BinaryWriter`] wraps any `Write + Seek` sink and tracks its own position
//! so sections can be back-patched.

mod reader;
mod writer;

pub use reader::{BinaryReader, decode_terminated};
pub use writer::BinaryWriter;

/// Round `value` up to the next multiple of `alignment`.
#[must_use]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 16), 0);
        assert_eq!(align_up(1, 16), 16);
        assert_eq!(align_up(32, 16), 32);
        assert_eq!(align_up(33, 32), 64);
        assert_eq!(align_up(7, 0), 7);
    }
}
