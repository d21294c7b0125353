//! CLI commands for MSBT and BMG text export and import

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::{load_function_map, read_input};
use crate::compression::{Compressor, zstd::strip_extension};
use crate::config::Settings;
use crate::formats::{compile_bmg, compile_msbt, parse_bmg_bytes, parse_msbt_bytes};
use crate::function_map::FunctionMap;
use crate::text::{deserialize_bmg, deserialize_msbt, serialize_bmg, serialize_msbt};

/// Message format selected by the subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Msbt,
    Bmg,
}

impl MessageFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Msbt => "msbt",
            Self::Bmg => "bmg",
        }
    }
}

/// Render binary message data as round-trip text
pub(crate) fn export_bytes(format: MessageFormat, data: &[u8], map: &FunctionMap) -> crate::Result<String> {
    match format {
        MessageFormat::Msbt => serialize_msbt(&parse_msbt_bytes(data, None)?, map),
        MessageFormat::Bmg => serialize_bmg(&parse_bmg_bytes(data, None)?, map),
    }
}

/// `<source>.txt`, without a `.zs` suffix
pub(crate) fn text_path(source: &Path) -> PathBuf {
    let mut name = OsString::from(strip_extension(source));
    name.push(".txt");
    PathBuf::from(name)
}

fn binary_path(source: &Path, format: MessageFormat, compress: bool) -> PathBuf {
    let mut path = if source.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) {
        source.with_extension("")
    } else {
        source.with_extension(format.extension())
    };
    if path.extension().is_none() {
        path.set_extension(format.extension());
    }
    if compress {
        let mut name = path.into_os_string();
        name.push(".zs");
        path = PathBuf::from(name);
    }
    path
}

pub fn export(
    format: MessageFormat,
    source: &Path,
    destination: Option<&Path>,
    map: Option<&Path>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let data = read_input(source, settings)?;
    let map = load_function_map(map, settings)?;
    let text = export_bytes(format, &data, &map)?;

    let destination = destination.map_or_else(|| text_path(source), Path::to_path_buf);
    fs::write(&destination, text)?;
    println!("Exported {} → {}", source.display(), destination.display());
    Ok(())
}

pub fn import(
    format: MessageFormat,
    source: &Path,
    destination: Option<&Path>,
    map: Option<&Path>,
    compress: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let content = fs::read_to_string(source)?;
    let map = load_function_map(map, settings)?;
    let mut data = match format {
        MessageFormat::Msbt => compile_msbt(&deserialize_msbt(&content, &map)?)?,
        MessageFormat::Bmg => compile_bmg(&deserialize_bmg(&content, &map)?)?,
    };
    if compress {
        data = settings.compressor()?.compress(&data)?;
    }

    let destination = destination.map_or_else(|| binary_path(source, format, compress), Path::to_path_buf);
    fs::write(&destination, data)?;
    println!("Imported {} → {}", source.display(), destination.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert_eq!(text_path(Path::new("Msg/Common.msbt.zs")), PathBuf::from("Msg/Common.msbt.txt"));
        assert_eq!(text_path(Path::new("Common.bmg")), PathBuf::from("Common.bmg.txt"));
        assert_eq!(
            binary_path(Path::new("Common.msbt.txt"), MessageFormat::Msbt, false),
            PathBuf::from("Common.msbt")
        );
        assert_eq!(
            binary_path(Path::new("Common.txt"), MessageFormat::Bmg, true),
            PathBuf::from("Common.bmg.zs")
        );
    }
}
