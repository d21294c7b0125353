//! Hashing utilities

/// Default multiplier of SARC name hashes.
pub const SARC_HASH_KEY: u32 = 101;

/// Multiplier of the MSBT label group hash.
pub const LABEL_HASH_KEY: u32 = 0x492;

/// SARC file name hash.
///
/// Bytes are sign-extended before being added, matching the archive tools
/// that produce these files.
pub fn sarc_hash(name: &str, key: u32) -> u32 {
    let mut hash: u32 = 0;
    for byte in name.bytes() {
        hash = hash
            .wrapping_mul(key)
            .wrapping_add(i32::from(byte as i8) as u32);
    }
    hash
}

/// Group index of an MSBT label within `groups` hash buckets.
pub fn label_group(label: &str, groups: u32) -> u32 {
    let mut hash: u32 = 0;
    for byte in label.bytes() {
        hash = hash.wrapping_mul(LABEL_HASH_KEY).wrapping_add(u32::from(byte));
    }
    if groups == 0 { 0 } else { hash % groups }
}
