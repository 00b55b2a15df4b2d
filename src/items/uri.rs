use crate::dock_error;
use crate::error::Result;
use std::path::{Path, PathBuf};
use url::Url;

/// Путь к файлу для лаунчера: `file://` URI либо абсолютный путь
pub fn to_path(launcher: &str) -> Option<PathBuf> {
    if launcher.is_empty() {
        return None;
    }

    if launcher.starts_with('/') {
        return Some(PathBuf::from(launcher));
    }

    let url = Url::parse(launcher).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

pub fn to_uri(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| dock_error!(internal, "Путь {:?} не является абсолютным", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_and_plain_path() {
        assert_eq!(
            to_path("file:///usr/share/applications/xterm.desktop"),
            Some(PathBuf::from("/usr/share/applications/xterm.desktop"))
        );
        assert_eq!(to_path("/usr/bin/vim"), Some(PathBuf::from("/usr/bin/vim")));
    }

    #[test]
    fn test_percent_encoded_uri() {
        assert_eq!(
            to_path("file:///home/user/My%20Files"),
            Some(PathBuf::from("/home/user/My Files"))
        );
        assert_eq!(
            to_uri(Path::new("/home/user/My Files")).unwrap(),
            "file:///home/user/My%20Files"
        );
    }

    #[test]
    fn test_unsupported_launchers() {
        assert_eq!(to_path(""), None);
        assert_eq!(to_path("https://example.com/"), None);
        assert_eq!(to_path("relative/path"), None);
        assert!(to_uri(Path::new("relative/path")).is_err());
    }
}
