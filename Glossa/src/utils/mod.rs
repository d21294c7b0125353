//! Utility functions

pub mod hash;
pub mod path;

pub use hash::{LABEL_HASH_KEY, SARC_HASH_KEY, label_group, sarc_hash};
pub use path::{archive_name, normalize_path};
