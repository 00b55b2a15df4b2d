use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Реестр приложений по умолчанию хост-системы
pub trait DefaultAppRegistry: Send + Sync {
    /// .desktop файл приложения по умолчанию для MIME-типа
    fn default_for_mime(&self, mime: &str) -> Option<PathBuf>;

    /// .desktop файл обработчика URI-схемы
    fn default_for_uri_scheme(&self, scheme: &str) -> Option<PathBuf> {
        self.default_for_mime(&format!("x-scheme-handler/{}", scheme))
    }
}

/// Реестр на основе `xdg-mime query default`
pub struct XdgMimeRegistry {
    application_dirs: Vec<PathBuf>,
}

impl Default for XdgMimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl XdgMimeRegistry {
    pub fn new() -> Self {
        Self {
            application_dirs: Self::xdg_application_dirs(),
        }
    }

    #[allow(dead_code)]
    pub fn with_application_dirs(application_dirs: Vec<PathBuf>) -> Self {
        Self { application_dirs }
    }

    fn xdg_application_dirs() -> Vec<PathBuf> {
        let mut found = Vec::new();

        if let Some(data_dir) = dirs::data_dir() {
            found.push(data_dir.join("applications"));
        }

        let data_dirs = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());

        found.extend(
            data_dirs
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(|dir| Path::new(dir).join("applications")),
        );

        found
    }

    /// Найти .desktop файл по его идентификатору (`org.gnome.Terminal.desktop`).
    ///
    /// Идентификатор с дефисами может соответствовать подкаталогам:
    /// `kde4-konsole.desktop` -> `kde4/konsole.desktop`.
    pub fn locate(&self, desktop_id: &str) -> Option<PathBuf> {
        for dir in &self.application_dirs {
            let direct = dir.join(desktop_id);
            if direct.is_file() {
                return Some(direct);
            }

            let nested = dir.join(desktop_id.replacen('-', "/", 1));
            if desktop_id.contains('-') && nested.is_file() {
                return Some(nested);
            }
        }

        None
    }

    fn query_default(mime: &str) -> Option<String> {
        let output = match Command::new("xdg-mime").args(["query", "default", mime]).output() {
            Ok(output) => output,
            Err(e) => {
                debug!("xdg-mime не найден или не работает: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            debug!(
                "xdg-mime вернул ошибку для {}: {}",
                mime,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let desktop_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!desktop_id.is_empty()).then_some(desktop_id)
    }
}

impl DefaultAppRegistry for XdgMimeRegistry {
    fn default_for_mime(&self, mime: &str) -> Option<PathBuf> {
        let desktop_id = Self::query_default(mime)?;
        let path = self.locate(&desktop_id);
        debug!("Приложение по умолчанию для {}: {} -> {:?}", mime, desktop_id, path);
        path
    }
}

/// Реестр с фиксированными ответами
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    defaults: HashMap<String, PathBuf>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_default(mut self, mime: impl Into<String>, desktop_file: impl Into<PathBuf>) -> Self {
        self.defaults.insert(mime.into(), desktop_file.into());
        self
    }
}

impl DefaultAppRegistry for StaticRegistry {
    fn default_for_mime(&self, mime: &str) -> Option<PathBuf> {
        self.defaults.get(mime).cloned()
    }
}
