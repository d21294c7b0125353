use clap::Subcommand;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::compression::{Compressor, maybe_decompress};
use crate::config::Settings;
use crate::function_map::FunctionMap;

pub mod convert;
pub mod definitions;
pub mod execute;
pub mod function_map;
pub mod info;
pub mod messages;
pub mod sarc;
pub mod umsbt;

use definitions::{FunctionMapCommands, MessageCommands, SarcCommands, UmsbtCommands};

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the format of a file and print a summary
    Info {
        /// File to inspect (may be Zstandard compressed)
        file: PathBuf,
    },

    /// MSBT message file operations
    Msbt {
        #[command(subcommand)]
        command: MessageCommands,
    },

    /// BMG message file operations
    Bmg {
        #[command(subcommand)]
        command: MessageCommands,
    },

    /// SARC archive operations
    Sarc {
        #[command(subcommand)]
        command: SarcCommands,
    },

    /// UMSBT bundle operations
    Umsbt {
        #[command(subcommand)]
        command: UmsbtCommands,
    },

    /// Function map operations
    FunctionMap {
        #[command(subcommand)]
        command: FunctionMapCommands,
    },

    /// Export every MSBT and BMG file under a directory to text
    Convert {
        /// Directory to scan
        source: PathBuf,

        /// Output directory (defaults to next to each source file)
        #[arg(short, long)]
        destination: Option<PathBuf>,

        /// Function map file
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Read a file and strip a Zstandard layer if present.
pub(crate) fn read_input(path: &Path, settings: &Settings) -> anyhow::Result<Vec<u8>> {
    let data = std::fs::read(path)?;
    let compressor = settings.compressor()?;
    let compressors: [&dyn Compressor; 1] = [&compressor];
    let plain = match maybe_decompress(&data, &compressors)? {
        Cow::Borrowed(_) => None,
        Cow::Owned(plain) => Some(plain),
    };
    Ok(plain.unwrap_or(data))
}

/// Function map from the command line, the settings, or an empty map.
pub(crate) fn load_function_map(path: Option<&Path>, settings: &Settings) -> anyhow::Result<FunctionMap> {
    Ok(match path {
        Some(path) => FunctionMap::from_file(path)?,
        None => settings.function_map()?,
    })
}
