//! UMSBT bundle reading

use super::{read_slots, slot_data};
use crate::error::{Error, Result};
use crate::formats::{MsbtFile, parse_msbt_bytes};
use std::path::Path;

/// Read a UMSBT bundle from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, otherwise see [`parse_umsbt_bytes`].
///
/// [`Error::Io`]: crate::Error::Io
pub fn read_umsbt<P: AsRef<Path>>(path: P, languages: &[String]) -> Result<Vec<MsbtFile>> {
    let data = std::fs::read(path)?;
    parse_umsbt_bytes(&data, languages)
}

/// Parse every MSBT slot of a UMSBT bundle
///
/// `languages[i]` is attached to slot `i`; slots past the end of the list
/// get no language.
///
/// # Errors
///
/// Returns [`Error::InvalidUmsbt`] if the slot table is empty or out of bounds.
/// Returns [`Error::UmsbtSlot`] wrapping the MSBT error of the first slot that fails.
///
/// [`Error::InvalidUmsbt`]: crate::Error::InvalidUmsbt
/// [`Error::UmsbtSlot`]: crate::Error::UmsbtSlot
pub fn parse_umsbt_bytes(data: &[u8], languages: &[String]) -> Result<Vec<MsbtFile>> {
    let slots = read_slots(data)
        .filter(|slots| !slots.is_empty())
        .ok_or(Error::InvalidUmsbt)?;

    tracing::debug!("UMSBT bundle with {} slots", slots.len());

    slots
        .iter()
        .enumerate()
        .map(|(index, &(offset, size))| {
            let language = languages.get(index).map(String::as_str);
            parse_msbt_bytes(slot_data(data, offset, size), language).map_err(|source| {
                Error::UmsbtSlot {
                    index,
                    source: Box::new(source),
                }
            })
        })
        .collect()
}
