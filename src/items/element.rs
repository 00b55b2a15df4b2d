use super::{keyfile, uri};
use std::fmt;
use std::path::{Path, PathBuf};

const APPLICATION_SUFFIX: &str = ".desktop";

/// Вид элемента дока, определяется по значению лаунчера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    SelfLauncher,
    Application,
    File,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::SelfLauncher => "self",
            ItemKind::Application => "application",
            ItemKind::File => "file",
        };
        f.write_str(name)
    }
}

pub fn classify(launcher: &str, self_launcher: &str) -> ItemKind {
    if launcher.ends_with(self_launcher) {
        ItemKind::SelfLauncher
    } else if launcher.ends_with(APPLICATION_SUFFIX) {
        ItemKind::Application
    } else {
        ItemKind::File
    }
}

/// Описатель элемента дока, прочитанный из файла `*.dockitem`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockItem {
    pub source: PathBuf,
    pub launcher: String,
    pub kind: ItemKind,
}

impl DockItem {
    pub fn new(source: PathBuf, launcher: String, self_launcher: &str) -> Self {
        let kind = classify(&launcher, self_launcher);
        Self { source, launcher, kind }
    }

    /// Имя файла описателя, под которым элемент хранится в токене порядка
    pub fn file_name(&self) -> &str {
        self.source
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("")
    }

    pub fn target(&self) -> Option<PathBuf> {
        uri::to_path(&self.launcher)
    }

    pub fn target_exists(&self) -> bool {
        self.target().is_some_and(|path| path.exists())
    }
}

/// Поведение элемента дока, выбранное по его виду
pub trait DockElement: Send + Sync {
    fn item(&self) -> &DockItem;

    fn display_name(&self) -> String;

    fn is_valid(&self) -> bool;

    fn kind(&self) -> ItemKind {
        self.item().kind
    }

    fn launcher(&self) -> &str {
        &self.item().launcher
    }

    fn source(&self) -> &Path {
        &self.item().source
    }

    fn file_name(&self) -> &str {
        self.item().file_name()
    }
}

pub struct SelfLauncherItem(DockItem);

pub struct ApplicationItem(DockItem);

pub struct FileItem(DockItem);

impl DockElement for SelfLauncherItem {
    fn item(&self) -> &DockItem {
        &self.0
    }

    fn display_name(&self) -> String {
        "Dock Preferences".to_string()
    }

    // Док сам себе лаунчер, целевой файл не обязателен
    fn is_valid(&self) -> bool {
        true
    }
}

impl DockElement for ApplicationItem {
    fn item(&self) -> &DockItem {
        &self.0
    }

    fn display_name(&self) -> String {
        let Some(path) = self.0.target() else {
            return self.0.launcher.clone();
        };

        keyfile::read_desktop_entry_name(&path).unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    fn is_valid(&self) -> bool {
        self.0.target_exists()
    }
}

impl DockElement for FileItem {
    fn item(&self) -> &DockItem {
        &self.0
    }

    fn display_name(&self) -> String {
        self.0
            .target()
            .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| self.0.launcher.clone())
    }

    fn is_valid(&self) -> bool {
        self.0.target_exists()
    }
}

pub fn make_element(item: DockItem) -> Box<dyn DockElement> {
    match item.kind {
        ItemKind::SelfLauncher => Box::new(SelfLauncherItem(item)),
        ItemKind::Application => Box::new(ApplicationItem(item)),
        ItemKind::File => Box::new(FileItem(item)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("file:///usr/share/applications/rdock.desktop", "rdock.desktop"),
            ItemKind::SelfLauncher
        );
        assert_eq!(
            classify("file:///usr/share/applications/xterm.desktop", "rdock.desktop"),
            ItemKind::Application
        );
        assert_eq!(classify("file:///home/user/Documents", "rdock.desktop"), ItemKind::File);
        assert_eq!(classify("", "rdock.desktop"), ItemKind::File);
    }

    #[test]
    fn test_application_element_uses_desktop_name() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = dir.path().join("xterm.desktop");
        fs::write(&desktop, "[Desktop Entry]\nName=XTerm\n").unwrap();

        let item = DockItem::new(
            dir.path().join("xterm.dockitem"),
            uri::to_uri(&desktop).unwrap(),
            "rdock.desktop",
        );
        let element = make_element(item);

        assert_eq!(element.kind(), ItemKind::Application);
        assert_eq!(element.display_name(), "XTerm");
        assert!(element.is_valid());

        fs::remove_file(&desktop).unwrap();
        assert!(!element.is_valid());
        assert_eq!(element.display_name(), "xterm");
    }

    #[test]
    fn test_file_and_self_elements() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "todo").unwrap();

        let file = make_element(DockItem::new(
            dir.path().join("notes.dockitem"),
            notes.to_string_lossy().into_owned(),
            "rdock.desktop",
        ));
        assert_eq!(file.kind(), ItemKind::File);
        assert_eq!(file.display_name(), "notes.txt");
        assert!(file.is_valid());

        let dock = make_element(DockItem::new(
            dir.path().join("rdock.dockitem"),
            "file:///nowhere/rdock.desktop".to_string(),
            "rdock.desktop",
        ));
        assert_eq!(dock.kind(), ItemKind::SelfLauncher);
        assert!(dock.is_valid());
        assert_eq!(dock.source(), dir.path().join("rdock.dockitem"));
        assert_eq!(dock.launcher(), "file:///nowhere/rdock.desktop");
    }
}
