//! CLI command for inspecting a file

use std::path::Path;

use super::read_input;
use crate::config::Settings;
use crate::formats::{
    FileFormat, detect_format, parse_aamp_bytes, parse_bcsv_bytes, parse_bmg_bytes, parse_byml_bytes,
    parse_msbt_bytes, parse_sarc_bytes, parse_umsbt_bytes,
};

fn endian_name(big_endian: bool) -> &'static str {
    if big_endian { "big" } else { "little" }
}

/// Detect the format of a file and print a summary
pub fn execute(file: &Path, settings: &Settings) -> anyhow::Result<()> {
    let data = read_input(file, settings)?;
    let Some(format) = detect_format(&data) else {
        anyhow::bail!("Unrecognized file format: {}", file.display());
    };

    println!("{}: {format}", file.display());
    match format {
        FileFormat::Msbt => {
            let msbt = parse_msbt_bytes(&data, None)?;
            println!("Byte order: {}", endian_name(msbt.big_endian));
            println!("Version: {}", msbt.version);
            println!("Encoding: {}", msbt.encoding.web_name());
            println!("Sections: {}", msbt.section_count());
            println!("Messages: {}", msbt.messages.len());
        }
        FileFormat::Bmg => {
            let bmg = parse_bmg_bytes(&data, None)?;
            println!("Byte order: {}", endian_name(bmg.big_endian));
            println!("Encoding: {}", bmg.encoding.web_name());
            println!("File id: {}", bmg.file_id);
            println!("Message ids: {}", if bmg.has_mid1 { "yes" } else { "no" });
            println!("Messages: {}", bmg.messages.len());
        }
        FileFormat::Sarc => {
            let sarc = parse_sarc_bytes(&data)?;
            println!("Byte order: {}", endian_name(sarc.big_endian));
            println!("Hash key: 0x{:X}", sarc.hash_key);
            println!("Files: {}", sarc.len());
        }
        FileFormat::Umsbt => {
            let slots = parse_umsbt_bytes(&data, &settings.umsbt_languages)?;
            for (index, msbt) in slots.iter().enumerate() {
                println!(
                    "Slot {index} ({}): {} messages",
                    msbt.language.as_deref().unwrap_or("-"),
                    msbt.messages.len()
                );
            }
        }
        FileFormat::Byml => {
            let byml = parse_byml_bytes(&data)?;
            println!("Byte order: {}", endian_name(byml.big_endian));
            println!("Version: {}", byml.version);
            println!("Root: {} ({} entries)", byml.root.type_name(), byml.root.len());
        }
        FileFormat::Aamp => {
            let aamp = parse_aamp_bytes(&data)?;
            println!("Byte order: {}", endian_name(aamp.big_endian));
            println!("Version: {}", aamp.version);
            println!("Data type: {}", aamp.data_type);
            println!(
                "Root: {} lists, {} objects",
                aamp.root.lists.len(),
                aamp.root.objects.len()
            );
        }
        FileFormat::Bcsv => {
            let bcsv = parse_bcsv_bytes(&data)?;
            println!("Columns: {}", bcsv.columns.len());
            println!("Rows: {}", bcsv.rows.len());
        }
    }

    Ok(())
}
