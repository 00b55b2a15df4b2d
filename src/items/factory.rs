use super::element::DockElement;
use super::loader::{self, DESCRIPTOR_SUFFIX};
use super::registry::DefaultAppRegistry;
use super::{keyfile, uri};
use crate::config::Config;
use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Загрузка и создание элементов дока в каталоге лаунчеров
pub struct ItemFactory {
    launchers_dir: PathBuf,
    self_launcher: String,
    registry: Box<dyn DefaultAppRegistry>,
    fallbacks: Vec<Vec<PathBuf>>,
}

impl ItemFactory {
    pub fn new(
        launchers_dir: impl Into<PathBuf>,
        self_launcher: impl Into<String>,
        registry: Box<dyn DefaultAppRegistry>,
    ) -> Self {
        Self {
            launchers_dir: launchers_dir.into(),
            self_launcher: self_launcher.into(),
            registry,
            fallbacks: Vec::new(),
        }
    }

    pub fn from_config(config: &Config, registry: Box<dyn DefaultAppRegistry>) -> Result<Self> {
        let factory = Self::new(config.launchers_dir()?, config.items.self_launcher.clone(), registry)
            .with_fallbacks(config.defaults.fallback_categories());
        Ok(factory)
    }

    /// Запасные приложения по категориям, первый существующий кандидат побеждает
    pub fn with_fallbacks(mut self, fallbacks: Vec<Vec<PathBuf>>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn launchers_dir(&self) -> &Path {
        &self.launchers_dir
    }

    pub fn is_first_run(&self) -> bool {
        !self.launchers_dir.is_dir() || loader::scan_directory(&self.launchers_dir).is_empty()
    }

    pub fn load_elements(&self, order: Option<&str>) -> Vec<Box<dyn DockElement>> {
        let elements = loader::load_elements(&self.launchers_dir, order, &self.self_launcher);
        info!("Загружено {} элементов дока из {:?}", elements.len(), self.launchers_dir);
        elements
    }

    /// Создать описатель для URI; `None` если цели нет или запись не удалась
    pub fn make_item_for_uri(&self, launcher: &str) -> Option<PathBuf> {
        let Some(target) = uri::to_path(launcher) else {
            debug!("Лаунчер '{}' не указывает на локальный файл", launcher);
            return None;
        };

        self.make_item_for_file(&target)
    }

    fn make_item_for_file(&self, target: &Path) -> Option<PathBuf> {
        if !target.exists() {
            debug!("Цель {:?} не существует, элемент не создан", target);
            return None;
        }

        let launcher = match uri::to_uri(target) {
            Ok(launcher) => launcher,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        if let Err(e) = fs::create_dir_all(&self.launchers_dir) {
            warn!("Не удалось создать каталог {:?}: {}", self.launchers_dir, e);
            return None;
        }

        let path = self.unique_descriptor_path(&descriptor_stem(target));
        match keyfile::write_descriptor(&path, &launcher) {
            Ok(()) => {
                info!("Создан элемент {:?} -> {}", path, launcher);
                Some(path)
            }
            Err(e) => {
                warn!("Не удалось записать элемент {:?}: {}", path, e);
                None
            }
        }
    }

    fn unique_descriptor_path(&self, stem: &str) -> PathBuf {
        let mut path = self.launchers_dir.join(format!("{}{}", stem, DESCRIPTOR_SUFFIX));
        let mut counter = 1;

        while path.exists() {
            path = self
                .launchers_dir
                .join(format!("{}-{}{}", stem, counter, DESCRIPTOR_SUFFIX));
            counter += 1;
        }

        path
    }

    /// Заполнить док приложениями по умолчанию хост-системы.
    ///
    /// Если реестр ничего не вернул, используются запасные списки по категориям.
    pub fn make_default_items(&self) -> Vec<PathBuf> {
        let registry = &self.registry;
        let defaults = [
            registry
                .default_for_uri_scheme("http")
                .or_else(|| registry.default_for_mime("text/html")),
            registry.default_for_uri_scheme("ssh"),
            registry.default_for_mime("text/calendar"),
            registry
                .default_for_mime("video/x-ogm")
                .or_else(|| registry.default_for_mime("audio/x-vorbis+ogg")),
        ];

        let mut seen = HashSet::new();
        let mut created = Vec::new();

        for desktop_file in defaults.into_iter().flatten() {
            if seen.insert(desktop_file.clone()) {
                created.extend(self.make_item_for_file(&desktop_file));
            }
        }

        if !created.is_empty() {
            info!("Добавлено {} приложений по умолчанию", created.len());
            return created;
        }

        debug!("Реестр приложений по умолчанию пуст, используем запасные списки");
        for category in &self.fallbacks {
            match category.iter().find(|candidate| candidate.exists()) {
                Some(candidate) if seen.insert(candidate.clone()) => {
                    created.extend(self.make_item_for_file(candidate));
                }
                Some(_) => {}
                None => debug!("Ни один кандидат не найден: {:?}", category),
            }
        }

        info!("Добавлено {} запасных приложений", created.len());
        created
    }
}

/// Основа имени описателя: имя файла цели без расширения и ведущих точек
fn descriptor_stem(target: &Path) -> String {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = stem.trim_start_matches('.');
    if stem.is_empty() {
        "item".to_string()
    } else {
        stem.to_string()
    }
}
