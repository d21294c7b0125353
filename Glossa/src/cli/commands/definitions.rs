//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

/// Commands shared by the MSBT and BMG formats
#[derive(Subcommand)]
pub enum MessageCommands {
    /// Convert a binary message file to editable text
    Export {
        /// Message file (may be Zstandard compressed)
        source: PathBuf,

        /// Output text file (defaults to <source>.txt)
        destination: Option<PathBuf>,

        /// Function map file
        #[arg(short, long)]
        map: Option<PathBuf>,
    },

    /// Compile editable text back to a binary message file
    Import {
        /// Text file
        source: PathBuf,

        /// Output file (defaults to <source> without .txt)
        destination: Option<PathBuf>,

        /// Function map file
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Wrap the output in a Zstandard frame
        #[arg(short = 'z', long)]
        compress: bool,
    },
}

/// SARC archive commands
#[derive(Subcommand)]
pub enum SarcCommands {
    /// List the files of an archive
    List {
        /// SARC file (may be Zstandard compressed)
        source: PathBuf,
    },

    /// Extract every file of an archive
    Extract {
        /// SARC file (may be Zstandard compressed)
        source: PathBuf,

        /// Output directory
        destination: PathBuf,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Pack a directory into an archive
    Pack {
        /// Directory to pack
        source: PathBuf,

        /// Output SARC file
        destination: PathBuf,

        /// Write a big-endian archive
        #[arg(long)]
        big_endian: bool,

        /// Wrap the output in a Zstandard frame
        #[arg(short = 'z', long)]
        compress: bool,
    },
}

/// UMSBT bundle commands
#[derive(Subcommand)]
pub enum UmsbtCommands {
    /// Split a bundle into one MSBT file per slot
    Extract {
        /// UMSBT file
        source: PathBuf,

        /// Output directory
        destination: PathBuf,
    },

    /// Join MSBT files into a bundle, in the order given
    Pack {
        /// MSBT files
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Output UMSBT file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Function map commands
#[derive(Subcommand)]
pub enum FunctionMapCommands {
    /// Compile a function map and list its functions
    Check {
        /// Function map file
        file: PathBuf,
    },
}
