//! AAMP parameter archives (read-only)
//!
//! A tree of parameter lists, each holding child lists and parameter
//! objects. Every node is named by a CRC32 hash, exposed here as `0x` +
//! uppercase hex.

mod reader;

pub use reader::{parse_aamp_bytes, read_aamp};

/// File magic
pub const AAMP_MAGIC: &[u8; 4] = b"AAMP";

/// Offset the root list offset is relative to
pub const HEADER_SIZE: u64 = 0x30;

/// Parameter type ids
pub mod param_type {
    pub const BOOL: u8 = 0;
    pub const F32: u8 = 1;
    pub const I32: u8 = 2;
    pub const VEC2: u8 = 3;
    pub const VEC3: u8 = 4;
    pub const VEC4: u8 = 5;
    pub const COLOR: u8 = 6;
    pub const STRING32: u8 = 7;
    pub const STRING64: u8 = 8;
    pub const CURVE1: u8 = 9;
    pub const CURVE2: u8 = 10;
    pub const CURVE3: u8 = 11;
    pub const CURVE4: u8 = 12;
    pub const BUFFER_I32: u8 = 13;
    pub const BUFFER_F32: u8 = 14;
    pub const STRING256: u8 = 15;
    pub const QUAT: u8 = 16;
    pub const U32: u8 = 17;
    pub const BUFFER_U32: u8 = 18;
    pub const BUFFER_BINARY: u8 = 19;
    pub const STRING_REF: u8 = 20;
}

/// One curve of a curve parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub ints: [u32; 2],
    pub floats: [f32; 30],
}

/// Typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    F32(f32),
    I32(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// RGBA
    Color([f32; 4]),
    String32(String),
    String64(String),
    Curves(Vec<Curve>),
    I32Buffer(Vec<i32>),
    F32Buffer(Vec<f32>),
    String256(String),
    Quat([f32; 4]),
    U32(u32),
    U32Buffer(Vec<u32>),
    BinaryBuffer(Vec<u8>),
    StringRef(String),
    /// A type id this reader does not decode
    Unknown(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterObject {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl ParameterObject {
    /// Get a parameter value by its hex name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterList {
    pub name: String,
    pub lists: Vec<ParameterList>,
    pub objects: Vec<ParameterObject>,
}

impl ParameterList {
    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&ParameterList> {
        self.lists.iter().find(|l| l.name == name)
    }

    #[must_use]
    pub fn get_object(&self, name: &str) -> Option<&ParameterObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

/// A parsed AAMP archive
#[derive(Debug, Clone, PartialEq)]
pub struct AampFile {
    pub big_endian: bool,
    pub version: u32,
    /// Strings are UTF-8 rather than ASCII
    pub utf8: bool,
    /// Data type tag stored before the root list, e.g. `xml`
    pub data_type: String,
    pub root: ParameterList,
}

impl AampFile {
    /// Check for the `AAMP` magic.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.starts_with(AAMP_MAGIC)
    }
}
