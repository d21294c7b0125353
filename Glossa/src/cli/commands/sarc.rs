//! CLI commands for SARC archives

use std::fs;
use std::path::{Component, Path};
use std::time::Instant;

use walkdir::WalkDir;

use super::read_input;
use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step, simple_bar};
use crate::compression::Compressor;
use crate::config::Settings;
use crate::formats::{SarcFile, compile_sarc, parse_sarc_bytes};
use crate::utils::archive_name;

/// Format byte size for human-readable output
fn format_size(bytes: usize) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

/// Entry names must stay inside the output directory.
fn is_safe_name(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

pub fn list(source: &Path, settings: &Settings) -> anyhow::Result<()> {
    let sarc = parse_sarc_bytes(&read_input(source, settings)?)?;

    println!("{:>10}  {:>10}  NAME", "SIZE", "HASH");
    for entry in &sarc.files {
        println!(
            "{:>10}  {:08X}  {}",
            format_size(entry.data.len()),
            sarc.hash_name(&entry.name),
            entry.name
        );
    }

    let total: usize = sarc.files.iter().map(|e| e.data.len()).sum();
    println!();
    println!("{} files, {} total", sarc.len(), format_size(total));
    Ok(())
}

pub fn extract(source: &Path, destination: &Path, quiet: bool, settings: &Settings) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, "Reading archive...");
    let sarc = parse_sarc_bytes(&read_input(source, settings)?)?;

    print_step(2, 2, PACKAGE, &format!("Extracting {} files...", sarc.len()));
    let pb = simple_bar(sarc.len() as u64, "Extracting", quiet);
    for entry in &sarc.files {
        if !is_safe_name(&entry.name) {
            tracing::warn!("Skipping entry with unsafe name {}", entry.name);
            pb.inc(1);
            continue;
        }
        let path = destination.join(&entry.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &entry.data)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_done(started.elapsed());
    Ok(())
}

pub fn pack(
    source: &Path,
    destination: &Path,
    big_endian: bool,
    compress: bool,
    settings: &Settings,
) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, "Collecting files...");
    let mut sarc = SarcFile {
        big_endian,
        ..SarcFile::default()
    };
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = archive_name(entry.path(), source) else {
            continue;
        };
        sarc.add_file(name, fs::read(entry.path())?);
    }

    print_step(2, 2, DISK, &format!("Writing {} files...", sarc.len()));
    let mut data = compile_sarc(&sarc)?;
    if compress {
        data = settings.compressor()?.compress(&data)?;
    }
    fs::write(destination, data)?;

    print_done(started.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_name() {
        assert!(is_safe_name("Message/Common.msbt"));
        assert!(is_safe_name("0x1234ABCD"));
        assert!(!is_safe_name("../escape.bin"));
        assert!(!is_safe_name("/absolute.bin"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512");
        assert_eq!(format_size(2048), "2.0K");
        assert_eq!(format_size(3 * 1_048_576), "3.0M");
    }
}
