//! Path utilities

use std::path::Path;

/// Normalize path separators to forward slashes (SARC entry names)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Name of `path` inside an archive rooted at `base`.
///
/// Returns `None` when `path` does not live under `base`.
pub fn archive_name<P: AsRef<Path>, B: AsRef<Path>>(path: P, base: B) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
        .map(|name| name.trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("Message\\Common.msbt"), "Message/Common.msbt");
    }

    #[test]
    fn test_archive_name() {
        let base = PathBuf::from("out");
        assert_eq!(
            archive_name(base.join("Layout").join("a.bflyt"), &base),
            Some("Layout/a.bflyt".to_string())
        );
        assert_eq!(archive_name("elsewhere/a.bin", &base), None);
    }
}
