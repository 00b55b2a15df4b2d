use std::fs;
use std::io;
use std::path::Path;

pub const DESCRIPTOR_GROUP: &str = "PlankDockItemPreferences";
pub const LAUNCHER_KEY: &str = "Launcher";

const DESKTOP_ENTRY_GROUP: &str = "Desktop Entry";

/// Значение ключа `key` в группе `group` файла формата key-file.
///
/// Комментарии, пустые строки и прочие группы пропускаются. Для повторяющегося
/// ключа побеждает последнее значение.
pub fn lookup(contents: &str, group: &str, key: &str) -> Option<String> {
    let mut in_group = false;
    let mut value = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_group = name == group;
            continue;
        }

        if !in_group {
            continue;
        }

        if let Some((k, v)) = line.split_once('=') {
            if k.trim() == key {
                value = Some(v.trim().to_string());
            }
        }
    }

    value
}

/// Лаунчер из содержимого файла `*.dockitem`, пустая строка если ключа нет
pub fn parse_launcher(contents: &str) -> String {
    lookup(contents, DESCRIPTOR_GROUP, LAUNCHER_KEY).unwrap_or_default()
}

pub fn render_descriptor(launcher: &str) -> String {
    format!("[{}]\n{}={}\n", DESCRIPTOR_GROUP, LAUNCHER_KEY, launcher)
}

pub fn write_descriptor(path: &Path, launcher: &str) -> io::Result<()> {
    fs::write(path, render_descriptor(launcher))
}

/// `Name=` из группы `[Desktop Entry]` файла .desktop
pub fn read_desktop_entry_name(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    lookup(&contents, DESKTOP_ENTRY_GROUP, "Name").filter(|name| !name.is_empty())
}
