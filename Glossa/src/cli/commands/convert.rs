//! CLI batch export of message files

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use super::load_function_map;
use super::messages::{MessageFormat, export_bytes, text_path};
use super::read_input;
use crate::cli::progress::{GEAR, LOOKING_GLASS, print_done, print_step, simple_bar};
use crate::compression::zstd::strip_extension;
use crate::config::Settings;
use crate::formats::FileFormat;

/// Message format of a path by extension, ignoring a `.zs` suffix.
fn message_format(path: &Path) -> Option<MessageFormat> {
    let ext = strip_extension(path).extension()?.to_string_lossy().into_owned();
    match FileFormat::from_extension(&ext)? {
        FileFormat::Msbt => Some(MessageFormat::Msbt),
        FileFormat::Bmg => Some(MessageFormat::Bmg),
        _ => None,
    }
}

pub fn execute(
    source: &Path,
    destination: Option<&Path>,
    map: Option<&Path>,
    quiet: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let map = load_function_map(map, settings)?;

    print_step(1, 2, LOOKING_GLASS, "Scanning for message files...");
    let mut files: Vec<(PathBuf, MessageFormat)> = Vec::new();
    for entry in WalkDir::new(source) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(format) = message_format(entry.path()) {
            files.push((entry.into_path(), format));
        }
    }

    print_step(2, 2, GEAR, &format!("Exporting {} files...", files.len()));
    let pb = simple_bar(files.len() as u64, "Exporting", quiet);
    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|(path, format)| {
            let target = match destination {
                Some(dir) => dir.join(text_path(path.strip_prefix(source).unwrap_or(path))),
                None => text_path(path),
            };
            let result = read_input(path, settings).and_then(|data| {
                let text = export_bytes(*format, &data, &map)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, text)?;
                Ok(())
            });
            pb.inc(1);
            result.err().map(|e| format!("{}: {e}", path.display()))
        })
        .collect();
    pb.finish_and_clear();

    for failure in &failures {
        tracing::error!("{failure}");
    }
    println!("{} exported, {} failed", files.len() - failures.len(), failures.len());
    print_done(started.elapsed());

    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} files failed to export", failures.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_format() {
        assert_eq!(message_format(Path::new("a/Common.msbt")), Some(MessageFormat::Msbt));
        assert_eq!(message_format(Path::new("a/Common.MSBT.zs")), Some(MessageFormat::Msbt));
        assert_eq!(message_format(Path::new("Menu.bmg")), Some(MessageFormat::Bmg));
        assert_eq!(message_format(Path::new("Pack.sarc")), None);
        assert_eq!(message_format(Path::new("README")), None);
    }
}
