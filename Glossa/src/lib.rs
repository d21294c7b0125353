//! # Glossa
//!
//! A pure-Rust library for Nintendo message and container formats.
//!
//! ## Supported Formats
//!
//! - **MSBT** - Message studio binary text, read and write
//! - **BMG** - Binary message files, read and write
//! - **SARC** - Archives, read and write
//! - **UMSBT** - Bundles of MSBT files, read and write
//! - **BYML/AAMP/BCSV** - Read-only parameter and table formats
//!
//! ## Quick Start
//!
//! ### Editing messages as text
//!
//! ```no_run
//! use glossa::function_map::FunctionMap;
//! use glossa::text::{convert_msbt_to_text, convert_text_to_msbt};
//!
//! let map = FunctionMap::from_file("functions.txt")?;
//! convert_msbt_to_text("Common.msbt", "Common.msbt.txt", &map)?;
//! // ... edit Common.msbt.txt ...
//! convert_text_to_msbt("Common.msbt.txt", "Common.msbt", &map)?;
//! # Ok::<(), glossa::Error>(())
//! ```
//!
//! ### Working with SARC archives
//!
//! ```no_run
//! use glossa::formats::{read_sarc, write_sarc};
//!
//! let mut sarc = read_sarc("Message.sarc")?;
//! for entry in &sarc.files {
//!     println!("{} ({} bytes)", entry.name, entry.data.len());
//! }
//! sarc.add_file("Extra.msbt", std::fs::read("Extra.msbt")?);
//! write_sarc("Message.sarc", &sarc)?;
//! # Ok::<(), glossa::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `glossa` command-line binary

pub mod binary;
pub mod compression;
pub mod config;
pub mod encoding;
pub mod error;
pub mod formats;
pub mod function_map;
pub mod function_table;
pub mod text;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::encoding::TextEncoding;
    pub use crate::config::Settings;
    pub use crate::compression::{Compressor, ZstdCompressor, maybe_decompress};

    pub use crate::formats::{
        AampFile, BcsvFile, BmgFile, BymlFile, BymlNode, FileFormat, FunctionCall, Message, MsbtFile,
        SarcEntry, SarcFile, detect_format,
    };
    pub use crate::function_map::FunctionMap;
    pub use crate::function_table::{ArgumentValue, DecodedFunction, FunctionTable};
    pub use crate::text::{
        DefaultFormatProvider, FormatProvider, deserialize_bmg, deserialize_msbt, serialize_bmg,
        serialize_msbt,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
