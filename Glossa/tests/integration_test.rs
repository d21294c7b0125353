use glossa::formats::{
    compile_msbt, compile_sarc, parse_sarc_bytes, read_bmg, read_msbt, read_umsbt, write_bmg,
    write_msbt, write_umsbt,
};
use glossa::prelude::*;
use glossa::text::{convert_bmg_to_text, convert_msbt_to_text, convert_text_to_bmg, convert_text_to_msbt};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const FUNCTIONS: &str = "\
# Shared control tags
[0, 3] color       # text colour
  {colors} value
  0xCDCD

[0, 4] size
  u16 percent

map colors u16
  0 white
  1 red
";

fn color(value: u8) -> FunctionCall {
    FunctionCall {
        group: 0,
        type_id: 3,
        args: vec![value, 0, 0xCD, 0xCD],
    }
}

fn sample_msbt() -> MsbtFile {
    MsbtFile {
        has_nli1: true,
        has_lbl1: true,
        label_groups: 101,
        has_atr1: true,
        has_attribute_text: true,
        has_tsy1: true,
        messages: vec![
            Message {
                label: "Talk_00".into(),
                index: Some(0),
                attribute_text: Some("Link".into()),
                style_index: Some(0),
                text: "Open the {{0}}door{{1}}.\nQuickly!".into(),
                functions: vec![
                    color(1),
                    FunctionCall {
                        group: 0,
                        type_id: 4,
                        args: vec![100, 0],
                    },
                ],
                ..Message::default()
            },
            Message {
                label: "Talk_01".into(),
                index: Some(1),
                attribute_text: Some(String::new()),
                style_index: Some(2),
                text: "Unmapped {{0}} tag".into(),
                functions: vec![FunctionCall {
                    group: 9,
                    type_id: 2,
                    args: vec![0x12, 0x34],
                }],
                ..Message::default()
            },
        ],
        ..MsbtFile::default()
    }
}

fn sample_bmg() -> BmgFile {
    BmgFile {
        file_id: 3,
        has_mid1: true,
        mid1_format: vec![0x10, 0x00],
        messages: vec![
            Message {
                label: "1000".into(),
                attribute: Some(vec![0, 0, 0, 1]),
                text: "Caf\u{e9} {{0}}menu".into(),
                functions: vec![color(0)],
                ..Message::default()
            },
            Message {
                label: "1001".into(),
                attribute: Some(vec![0, 0, 0, 2]),
                text: "Second".into(),
                ..Message::default()
            },
        ],
        ..BmgFile::default()
    }
}

#[test]
fn test_msbt_text_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let map_path = dir.path().join("functions.txt");
    std::fs::write(&map_path, FUNCTIONS).unwrap();
    let map = FunctionMap::from_file(&map_path).unwrap();

    let original = dir.path().join("Talk.msbt");
    let text = dir.path().join("Talk.msbt.txt");
    let rebuilt = dir.path().join("Rebuilt.msbt");
    write_msbt(&original, &sample_msbt()).unwrap();

    convert_msbt_to_text(&original, &text, &map).unwrap();
    let content = std::fs::read_to_string(&text).unwrap();
    assert!(content.contains("Open the {{color value=\"red\"}}door{{size percent=\"100\"}}.\nQuickly!\n"));
    assert!(content.contains("Unmapped {{9:2 arg=\"0x1234\"}} tag\n"));
    assert!(content.contains("label: Talk_01\nindex: 1\nattributeText: \nstyleIndex: 2\n"));

    convert_text_to_msbt(&text, &rebuilt, &map).unwrap();
    assert_eq!(std::fs::read(&rebuilt).unwrap(), std::fs::read(&original).unwrap());
    assert_eq!(read_msbt(&rebuilt, None).unwrap(), sample_msbt());
}

#[test]
fn test_bmg_text_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let map = FunctionMap::parse(FUNCTIONS).unwrap();

    let original = dir.path().join("Menu.bmg");
    let text = dir.path().join("Menu.bmg.txt");
    let rebuilt = dir.path().join("Rebuilt.bmg");
    write_bmg(&original, &sample_bmg()).unwrap();

    convert_bmg_to_text(&original, &text, &map).unwrap();
    let content = std::fs::read_to_string(&text).unwrap();
    assert!(content.contains("label: 1000\nattribute: 0x00000001\n---\nCaf\u{e9} {{color value=\"white\"}}menu\n"));

    convert_text_to_bmg(&text, &rebuilt, &map).unwrap();
    assert_eq!(std::fs::read(&rebuilt).unwrap(), std::fs::read(&original).unwrap());
    assert_eq!(read_bmg(&rebuilt, None).unwrap(), sample_bmg());
}

#[test]
fn test_compressed_archive_of_messages() {
    let msbt = compile_msbt(&sample_msbt()).unwrap();
    let mut sarc = SarcFile::default();
    sarc.add_file("Message/Talk.msbt", msbt.clone());
    sarc.add_file("Message/Other.msbt", vec![0; 8]);

    let zstd = ZstdCompressor::new(3);
    let packed = zstd.compress(&compile_sarc(&sarc).unwrap()).unwrap();
    assert_eq!(detect_format(&packed), None);

    let plain = maybe_decompress(&packed, &[&zstd]).unwrap();
    assert_eq!(detect_format(&plain), Some(FileFormat::Sarc));

    let archive = parse_sarc_bytes(&plain).unwrap();
    let entry = archive.get_file("Message/Talk.msbt").unwrap();
    assert_eq!(entry.data, msbt);
    assert_eq!(detect_format(&entry.data), Some(FileFormat::Msbt));
}

#[test]
fn test_umsbt_languages() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Talk.umsbt");

    let mut second = sample_msbt();
    second.messages[0].text = "Ouvre la {{0}}porte{{1}}.".into();
    write_umsbt(&path, &[sample_msbt(), second.clone()]).unwrap();

    let languages = vec!["USen".to_string(), "EUfr".to_string()];
    let slots = read_umsbt(&path, &languages).unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].language.as_deref(), Some("EUfr"));
    assert_eq!(slots[1].messages, second.messages);
    assert_eq!(detect_format(&std::fs::read(&path).unwrap()), Some(FileFormat::Umsbt));
}

#[test]
fn test_settings_drive_conversion() {
    let dir = tempdir().unwrap();
    let map_path = dir.path().join("functions.txt");
    std::fs::write(&map_path, FUNCTIONS).unwrap();

    let settings = Settings {
        function_map: Some(map_path),
        zstd_level: 1,
        ..Settings::default()
    };
    let settings_path = dir.path().join("settings.toml");
    settings.save(&settings_path).unwrap();

    let loaded = Settings::load(&settings_path).unwrap();
    let map = loaded.function_map().unwrap();
    assert_eq!(map.len(), 2);

    let text = serialize_msbt(&sample_msbt(), &map).unwrap();
    assert_eq!(deserialize_msbt(&text, &map).unwrap(), sample_msbt());
}
