//! Error types for `Glossa`

use thiserror::Error;

/// The error type for `Glossa` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A read ran past the end of the input.
    #[error("unexpected end of data at offset 0x{offset:X}")]
    UnexpectedEof {
        /// Position of the read that failed.
        offset: u64,
    },

    /// An offset or length stored in the file points outside the data.
    #[error("invalid offset 0x{offset:X} (data length 0x{len:X})")]
    InvalidOffset {
        /// The offending offset.
        offset: u64,
        /// Total length of the data being read.
        len: u64,
    },

    // ==================== Text Encoding Errors ====================
    /// The file declares an encoding that the format does not support.
    #[error("unsupported {format} encoding: {encoding}")]
    UnsupportedEncoding {
        /// Format that rejected the encoding.
        format: &'static str,
        /// Encoding name or raw encoding byte.
        encoding: String,
    },

    /// Text contains characters that the target encoding cannot represent.
    #[error("text cannot be encoded as {encoding}: {text:?}")]
    Encoding {
        /// Web name of the target encoding.
        encoding: &'static str,
        /// The text that failed to encode.
        text: String,
    },

    // ==================== Container Errors ====================
    /// The file is not a valid MSBT file (missing `MsgStdBn` magic).
    #[error("invalid MSBT magic: expected MsgStdBn")]
    InvalidMsbtMagic,

    /// The file is not a valid BMG file (missing `MESGbmg1` magic).
    #[error("invalid BMG magic: expected MESGbmg1")]
    InvalidBmgMagic,

    /// The file is not a valid SARC archive (missing `SARC` magic).
    #[error("invalid SARC magic: expected SARC")]
    InvalidSarcMagic,

    /// The file is not a valid UMSBT bundle.
    #[error("invalid UMSBT data: offset table is empty or a slot is not an MSBT file")]
    InvalidUmsbt,

    /// A UMSBT slot failed to parse.
    #[error("UMSBT slot {index}: {source}")]
    UmsbtSlot {
        /// Index of the slot in the offset table.
        index: usize,
        /// The error raised by the MSBT parser.
        source: Box<Error>,
    },

    /// The file is not a valid BYML document (missing `BY`/`YB` magic).
    #[error("invalid BYML magic: expected BY or YB, found {0:?}")]
    InvalidBymlMagic([u8; 2]),

    /// The BYML document contains a node type this reader does not know.
    #[error("unknown BYML node type 0x{0:02X}")]
    UnknownBymlNode(u8),

    /// The file is not a valid AAMP parameter archive.
    #[error("invalid AAMP magic: expected AAMP")]
    InvalidAampMagic,

    /// The file is not a valid BCSV table (missing `VSCB` signature).
    #[error("invalid BCSV signature: expected VSCB")]
    InvalidBcsvMagic,

    /// A SARC entry name is neither a real path nor a `0x` hash placeholder.
    #[error("invalid SARC hash placeholder: {0}")]
    InvalidSarcName(String),

    /// A BMG message label could not be stored as a numeric MID1 id.
    #[error("BMG label \"{0}\" is not a valid MID1 id")]
    InvalidBmgLabel(String),

    /// Message text lost one of its `{{n}}` function placeholders.
    #[error("message \"{label}\" is missing placeholder {{{{{index}}}}}")]
    MissingPlaceholder {
        /// Label of the message.
        label: String,
        /// Index of the function whose placeholder is missing.
        index: usize,
    },

    /// The model holds a value that cannot be written in the binary layout.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    // ==================== Function Map Errors ====================
    /// Function map source text is malformed.
    #[error("function map error on line {line}: {message}")]
    FunctionMapSyntax {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A text value could not be converted to the binary form of a data type.
    #[error("cannot convert \"{value}\" to {data_type}")]
    InvalidValue {
        /// Name of the target data type.
        data_type: String,
        /// The rejected value.
        value: String,
    },

    /// Argument bytes of a function call do not match its definition.
    #[error("failed to parse function argument value of \"{argument}\" on \"{function}\" as {data_type}")]
    FunctionArgument {
        /// Display name of the function.
        function: String,
        /// Name of the argument.
        argument: String,
        /// Name of the data type.
        data_type: String,
    },

    /// A mapped function was called with a type id missing from its value map.
    #[error("function \"{function}\" has no mapped value for type {type_id}")]
    UnmappedFunctionType {
        /// Display name of the function.
        function: String,
        /// The unmapped type id.
        type_id: u16,
    },

    // ==================== Text Format Errors ====================
    /// Round-trip text is malformed.
    #[error("{message} (line {line})")]
    TextFormat {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    // ==================== Compression Errors ====================
    /// Decompression failed.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Compression failed.
    #[error("compression failed: {0}")]
    Compression(String),

    // ==================== Configuration Errors ====================
    /// Settings file could not be parsed.
    #[error("settings error: {0}")]
    Config(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("settings serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Directory traversal failed.
    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// Result type alias for `Glossa` operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for a [`Error::TextFormat`] error.
    pub(crate) fn text(line: usize, message: impl Into<String>) -> Self {
        Self::TextFormat {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::FunctionMapSyntax`] error.
    pub(crate) fn function_map(line: usize, message: impl Into<String>) -> Self {
        Self::FunctionMapSyntax {
            line,
            message: message.into(),
        }
    }
}
