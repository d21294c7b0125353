//! CLI commands for UMSBT bundles

use std::fs;
use std::path::{Path, PathBuf};

use super::read_input;
use crate::config::Settings;
use crate::formats::{compile_msbt, parse_umsbt_bytes, read_msbt, write_umsbt};

/// Split a bundle into `<stem>_<language or slot>.msbt` files
pub fn extract(source: &Path, destination: &Path, settings: &Settings) -> anyhow::Result<()> {
    let slots = parse_umsbt_bytes(&read_input(source, settings)?, &settings.umsbt_languages)?;
    let stem = source
        .file_stem()
        .map_or_else(|| "bundle".to_string(), |s| s.to_string_lossy().into_owned());

    fs::create_dir_all(destination)?;
    for (index, msbt) in slots.iter().enumerate() {
        let suffix = msbt.language.clone().unwrap_or_else(|| index.to_string());
        let path = destination.join(format!("{stem}_{suffix}.msbt"));
        fs::write(&path, compile_msbt(msbt)?)?;
        println!("{}", path.display());
    }

    println!("{} slots extracted", slots.len());
    Ok(())
}

/// Join MSBT files into a bundle in the given order
pub fn pack(sources: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let files = sources
        .iter()
        .map(|path| read_msbt(path, None))
        .collect::<crate::Result<Vec<_>>>()?;
    write_umsbt(output, &files)?;
    println!("Packed {} slots → {}", files.len(), output.display());
    Ok(())
}
