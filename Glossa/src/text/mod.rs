//! Editable text round-trip for message files
//!
//! MSBT and BMG files are rendered as a plain text document that can be
//! edited and compiled back to an identical binary:
//!
//! ```text
//! %%%
//! bigEndian: false
//! encoding: utf-16
//! %%%
//!
//! ---
//! label: intro
//! ---
//! Hello {{color value="blue"}}!
//! ```
//!
//! The header between `%%%` lines holds the file properties, each message
//! starts with a `---` block of message properties, and function calls are
//! written with the names and arguments of a [`FunctionMap`].
//!
//! [`FunctionMap`]: crate::function_map::FunctionMap

mod deserialize;
mod format_provider;
mod serialize;

pub use deserialize::{deserialize_bmg, deserialize_msbt};
pub use format_provider::{DefaultFormatProvider, FormatProvider};
pub use serialize::{serialize_bmg, serialize_bmg_with, serialize_msbt, serialize_msbt_with};

use crate::error::Result;
use crate::formats::{bmg, msbt};
use crate::function_map::FunctionMap;
use std::path::Path;

/// Convert an MSBT file to round-trip text
pub fn convert_msbt_to_text<P: AsRef<Path>>(source: P, dest: P, map: &FunctionMap) -> Result<()> {
    tracing::info!("Converting MSBT→text: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let file = msbt::read_msbt(&source, None)?;
    std::fs::write(dest, serialize_msbt(&file, map)?)?;
    Ok(())
}

/// Compile round-trip text to an MSBT file
pub fn convert_text_to_msbt<P: AsRef<Path>>(source: P, dest: P, map: &FunctionMap) -> Result<()> {
    tracing::info!("Converting text→MSBT: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let content = std::fs::read_to_string(&source)?;
    msbt::write_msbt(dest, &deserialize_msbt(&content, map)?)
}

/// Convert a BMG file to round-trip text
pub fn convert_bmg_to_text<P: AsRef<Path>>(source: P, dest: P, map: &FunctionMap) -> Result<()> {
    tracing::info!("Converting BMG→text: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let file = bmg::read_bmg(&source, None)?;
    std::fs::write(dest, serialize_bmg(&file, map)?)?;
    Ok(())
}

/// Compile round-trip text to a BMG file
pub fn convert_text_to_bmg<P: AsRef<Path>>(source: P, dest: P, map: &FunctionMap) -> Result<()> {
    tracing::info!("Converting text→BMG: {:?} → {:?}", source.as_ref(), dest.as_ref());
    let content = std::fs::read_to_string(&source)?;
    bmg::write_bmg(dest, &deserialize_bmg(&content, map)?)
}
