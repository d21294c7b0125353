//! UMSBT bundles
//!
//! A UMSBT file concatenates several MSBT files, usually one per language,
//! behind a little-endian table of `(offset, size)` pairs. It has no magic
//! of its own.

mod reader;
mod writer;

pub use reader::{parse_umsbt_bytes, read_umsbt};
pub use writer::{compile_umsbt, write_umsbt, write_umsbt_to};

use crate::binary::BinaryReader;
use crate::formats::MsbtFile;

/// Read the slot table. Returns `None` if a slot points past the data.
pub(crate) fn read_slots(data: &[u8]) -> Option<Vec<(u32, u32)>> {
    let mut reader = BinaryReader::new(data);
    let first = u64::from(reader.read_u32_at(0).ok()?);
    reader.jump_to(0);

    let mut slots = Vec::new();
    while reader.position() < first {
        let offset = reader.read_u32().ok()?;
        let size = reader.read_u32().ok()?;
        if u64::from(offset) + u64::from(size) > reader.len() {
            return None;
        }
        if offset == 0 || size == 0 {
            break;
        }
        slots.push((offset, size));
    }
    Some(slots)
}

/// Check for a non-empty slot table whose every slot holds an MSBT file.
#[must_use]
pub fn can_parse(data: &[u8]) -> bool {
    read_slots(data).is_some_and(|slots| {
        !slots.is_empty()
            && slots
                .iter()
                .all(|&(offset, size)| MsbtFile::can_parse(slot_data(data, offset, size)))
    })
}

/// Bytes of one slot; callers have checked the bounds in [`read_slots`].
fn slot_data(data: &[u8], offset: u32, size: u32) -> &[u8] {
    let start = offset as usize;
    &data[start..start + size as usize]
}
