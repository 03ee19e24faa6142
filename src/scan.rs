use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

/// Collect every `.wxapkg` file under `root`, in path order. A `root` that
/// is itself a `.wxapkg` file yields just that file. Unreadable
/// subdirectories are skipped rather than failing the scan.
pub fn scan_packages(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_package(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_package(e.path()))
        .map(|e| e.into_path())
        .collect();
    found.sort();
    found
}

fn is_package(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "wxapkg")
}

/// Recover a wxid from a path: the first `wx` + 16 hex digits segment.
pub fn parse_wxid(path: &str) -> Option<String> {
    static WXID_RE: OnceLock<Regex> = OnceLock::new();
    let re = WXID_RE.get_or_init(|| Regex::new(r"(wx[0-9a-f]{16})").unwrap());
    re.find(path).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_finds_nested_packages() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("wx1234567890abcdef/7")).unwrap();
        fs::write(dir.path().join("wx1234567890abcdef/7/__APP__.wxapkg"), b"x").unwrap();
        fs::write(dir.path().join("wx1234567890abcdef/7/sub.wxapkg"), b"x").unwrap();
        fs::write(dir.path().join("wx1234567890abcdef/7/notes.txt"), b"x").unwrap();

        let found = scan_packages(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("__APP__.wxapkg"));
        assert!(found[1].ends_with("sub.wxapkg"));
    }

    #[test]
    fn test_scan_single_file() {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join("one.wxapkg");
        fs::write(&pkg, b"x").unwrap();

        assert_eq!(scan_packages(&pkg), vec![pkg]);
        assert!(scan_packages(&dir.path().join("missing.txt")).is_empty());
    }

    #[test]
    fn test_parse_wxid() {
        assert_eq!(
            parse_wxid("/home/u/Applet/wx1234567890abcdef/7/__APP__.wxapkg"),
            Some("wx1234567890abcdef".to_string())
        );
        assert_eq!(parse_wxid("/tmp/nothing-here"), None);
        // Uppercase hex is not a wxid.
        assert_eq!(parse_wxid("wx1234567890ABCDEF"), None);
    }
}
