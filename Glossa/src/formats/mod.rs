//! File format handlers for message containers
//!
//! MSBT, BMG, SARC and UMSBT can be read and written. BYML, AAMP and BCSV
//! are read-only. [`detect_format`] identifies raw data by its signature.

pub mod aamp;
pub mod bcsv;
pub mod bmg;
pub mod byml;
mod message;
pub mod msbt;
pub mod sarc;
pub mod umsbt;

use crate::error::{Error, Result};
use serde::Serialize;

pub use message::{FunctionCall, Message, placeholder};
pub(crate) use message::Segment;

pub use aamp::{AampFile, parse_aamp_bytes};
pub use bcsv::{BcsvFile, parse_bcsv_bytes};
pub use bmg::{BmgFile, compile_bmg, parse_bmg_bytes, read_bmg, write_bmg};
pub use byml::{BymlFile, BymlNode, parse_byml_bytes};
pub use msbt::{MsbtFile, compile_msbt, parse_msbt_bytes, read_msbt, write_msbt};
pub use sarc::{SarcEntry, SarcFile, compile_sarc, parse_sarc_bytes, read_sarc, write_sarc};
pub use umsbt::{compile_umsbt, parse_umsbt_bytes, read_umsbt, write_umsbt};

/// File formats recognised by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileFormat {
    Sarc,
    Umsbt,
    Msbt,
    Bmg,
    Byml,
    Aamp,
    Bcsv,
}

/// Signature checks, tried in order.
///
/// UMSBT has no magic of its own and must run after SARC; its offset table
/// check rejects MSBT data.
pub const DETECTORS: &[(FileFormat, fn(&[u8]) -> bool)] = &[
    (FileFormat::Sarc, SarcFile::can_parse),
    (FileFormat::Umsbt, umsbt::can_parse),
    (FileFormat::Msbt, MsbtFile::can_parse),
    (FileFormat::Bmg, BmgFile::can_parse),
    (FileFormat::Byml, BymlFile::can_parse),
    (FileFormat::Aamp, AampFile::can_parse),
    (FileFormat::Bcsv, BcsvFile::can_parse),
];

/// Identify a file by its signature.
#[must_use]
pub fn detect_format(data: &[u8]) -> Option<FileFormat> {
    DETECTORS
        .iter()
        .find(|(_, can_parse)| can_parse(data))
        .map(|(format, _)| *format)
}

impl FileFormat {
    /// Determine the format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "sarc" | "pack" | "arc" | "bars" | "bfarc" | "blarc" | "szs" | "zs" => Some(Self::Sarc),
            "umsbt" => Some(Self::Umsbt),
            "msbt" => Some(Self::Msbt),
            "bmg" => Some(Self::Bmg),
            "byml" | "byaml" | "bgyml" => Some(Self::Byml),
            "aamp" | "bgparamlist" | "bxml" => Some(Self::Aamp),
            "bcsv" => Some(Self::Bcsv),
            _ => None,
        }
    }

    /// Get display name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sarc => "SARC",
            Self::Umsbt => "UMSBT",
            Self::Msbt => "MSBT",
            Self::Bmg => "BMG",
            Self::Byml => "BYML",
            Self::Aamp => "AAMP",
            Self::Bcsv => "BCSV",
        }
    }

    /// Whether the format holds messages that round-trip through text.
    #[must_use]
    pub fn is_message_format(&self) -> bool {
        matches!(self, Self::Msbt | Self::Bmg)
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fewest node visits allowed for any tree-shaped document
const MIN_NODE_BUDGET: usize = 1 << 16;

/// Caps the nodes visited while walking an offset-linked tree.
///
/// Containers may point at the same child, so a small file can describe
/// an exponentially large tree. The budget is the larger of four visits
/// per data byte and [`MIN_NODE_BUDGET`].
pub(crate) struct NodeBudget {
    format: &'static str,
    remaining: usize,
}

impl NodeBudget {
    pub(crate) fn for_data(format: &'static str, data: &[u8]) -> Self {
        Self::with_limit(format, data.len().saturating_mul(4).max(MIN_NODE_BUDGET))
    }

    pub(crate) fn with_limit(format: &'static str, remaining: usize) -> Self {
        Self { format, remaining }
    }

    /// Account for the node at `offset`.
    pub(crate) fn take(&mut self, offset: u64) -> Result<()> {
        self.remaining = self.remaining.checked_sub(1).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "{} node limit reached at 0x{offset:X}; nodes are shared too often",
                self.format
            ))
        })?;
        Ok(())
    }
}
