use super::element::{make_element, DockElement, DockItem};
use super::{keyfile, ordering};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

pub const DESCRIPTOR_SUFFIX: &str = ".dockitem";

fn is_descriptor_name(name: &str) -> bool {
    !name.starts_with('.') && name.len() > DESCRIPTOR_SUFFIX.len() && name.ends_with(DESCRIPTOR_SUFFIX)
}

/// Файлы `*.dockitem` каталога, без скрытых, в порядке имён.
///
/// Отсутствующий или нечитаемый каталог не ошибка для вызывающего: пустой результат.
pub fn scan_directory(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Не удалось прочитать каталог элементов {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut descriptors = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("Ошибка перечисления каталога {:?}: {}", dir, e);
                return Vec::new();
            }
        };

        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if !is_descriptor_name(name) {
            debug!("Пропускаем файл {:?}", path);
            continue;
        }

        if !path.is_file() {
            continue;
        }

        descriptors.push(path);
    }

    descriptors.sort();
    descriptors
}

/// Лаунчер описателя; нечитаемый файл даёт пустую строку
pub fn parse_descriptor(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let launcher = keyfile::parse_launcher(&contents);
            if launcher.is_empty() {
                warn!("В описателе {:?} нет ключа {}", path, keyfile::LAUNCHER_KEY);
            }
            launcher
        }
        Err(e) => {
            warn!("Не удалось прочитать описатель {:?}: {}", path, e);
            String::new()
        }
    }
}

/// Просканировать каталог и разобрать все описатели в порядке сканирования
pub fn read_items(dir: &Path, self_launcher: &str) -> Vec<DockItem> {
    scan_directory(dir)
        .into_iter()
        .map(|path| {
            let launcher = parse_descriptor(&path);
            DockItem::new(path, launcher, self_launcher)
        })
        .collect()
}

/// Загрузить действительные элементы дока и упорядочить их по токену
pub fn load_elements(dir: &Path, order: Option<&str>, self_launcher: &str) -> Vec<Box<dyn DockElement>> {
    let mut elements = Vec::new();

    for item in read_items(dir, self_launcher) {
        if item.launcher.is_empty() {
            warn!("Пропускаем описатель {:?} без лаунчера", item.source);
            continue;
        }

        let element = make_element(item);
        if !element.is_valid() {
            warn!(
                "Цель лаунчера '{}' из {:?} не существует, элемент пропущен",
                element.launcher(),
                element.source()
            );
            continue;
        }

        debug!("Загружен элемент {} ({})", element.file_name(), element.kind());
        elements.push(element);
    }

    ordering::reconcile(elements, order, |element| element.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::element::ItemKind;
    use crate::items::uri;

    fn write_item(dir: &Path, name: &str, launcher: &str) {
        keyfile::write_descriptor(&dir.join(name), launcher).unwrap();
    }

    #[test]
    fn test_scan_skips_hidden_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.dockitem", "a.dockitem", "c.dockitem"] {
            write_item(dir.path(), name, "file:///bin/sh");
        }
        write_item(dir.path(), ".hidden.dockitem", "file:///bin/sh");
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("a.dockitem.bak"), "x").unwrap();
        fs::create_dir(dir.path().join("dir.dockitem")).unwrap();

        let names: Vec<_> = scan_directory(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.dockitem", "b.dockitem", "c.dockitem"]);
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("launchers");

        assert!(scan_directory(&missing).is_empty());
        assert!(load_elements(&missing, Some("a.dockitem"), "rdock.desktop").is_empty());
    }

    #[test]
    fn test_missing_targets_are_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a");
        fs::write(&existing, "#!/bin/sh\n").unwrap();

        write_item(dir.path(), "a.dockitem", &uri::to_uri(&existing).unwrap());
        write_item(
            dir.path(),
            "b.dockitem",
            &uri::to_uri(&dir.path().join("missing")).unwrap(),
        );

        let elements = load_elements(dir.path(), None, "rdock.desktop");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].file_name(), "a.dockitem");
        assert_eq!(elements[0].kind(), ItemKind::File);
    }

    #[test]
    fn test_malformed_descriptor_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.dockitem"), "not a key file").unwrap();
        fs::write(dir.path().join("binary.dockitem"), [0xffu8, 0xfe, 0x00]).unwrap();

        let items = read_items(dir.path(), "rdock.desktop");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.launcher.is_empty()));

        assert!(load_elements(dir.path(), None, "rdock.desktop").is_empty());
    }

    #[test]
    fn test_self_launcher_kept_and_order_applied() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = dir.path().join("xterm.desktop");
        fs::write(&desktop, "[Desktop Entry]\nName=XTerm\n").unwrap();

        write_item(dir.path(), "a.dockitem", &uri::to_uri(&desktop).unwrap());
        write_item(dir.path(), "b.dockitem", "file:///usr/share/applications/rdock.desktop");

        let elements = load_elements(dir.path(), Some("b.dockitem;;a.dockitem"), "rdock.desktop");
        let names: Vec<_> = elements.iter().map(|e| e.file_name()).collect();

        assert_eq!(names, vec!["b.dockitem", "a.dockitem"]);
        assert_eq!(elements[0].kind(), ItemKind::SelfLauncher);
        assert_eq!(elements[1].kind(), ItemKind::Application);
    }
}
