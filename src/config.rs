use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub items: ItemsConfig,
    pub defaults: DefaultsConfig,
    pub matcher: MatcherConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemsConfig {
    /// Каталог с файлами `*.dockitem`, "auto" - каталог конфигурации пользователя
    pub launchers_dir: String,
    /// Имя лаунчера самого дока
    pub self_launcher: String,
    /// Сохранённый порядок элементов (имена файлов через ";;")
    #[serde(default)]
    pub dock_items: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub browser: Vec<String>,
    #[serde(default)]
    pub terminal: Vec<String>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub im: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatcherConfig {
    pub backend: String,
    pub emulation_interval_ms: u64,
}

impl DefaultsConfig {
    /// Категории запасных приложений в порядке добавления в док
    pub fn fallback_categories(&self) -> Vec<Vec<PathBuf>> {
        [&self.browser, &self.terminal, &self.media, &self.im]
            .iter()
            .map(|candidates| candidates.iter().map(PathBuf::from).collect())
            .collect()
    }
}

fn applications(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|name| format!("/usr/share/applications/{}.desktop", name))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "rdock=info".to_string(),
            },
            items: ItemsConfig {
                launchers_dir: "auto".to_string(),
                self_launcher: "rdock.desktop".to_string(),
                dock_items: None,
            },
            defaults: DefaultsConfig {
                enabled: true,
                browser: applications(&["chromium-browser", "firefox", "epiphany", "midori"]),
                terminal: applications(&["terminator", "gnome-terminal", "konsole", "xterm"]),
                media: applications(&["rhythmbox", "banshee", "totem", "vlc"]),
                im: applications(&["pidgin", "empathy"]),
            },
            matcher: MatcherConfig {
                backend: "bamf".to_string(),
                emulation_interval_ms: 5000,
            },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("RDOCK_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек элементов
        if self.items.launchers_dir.is_empty() {
            anyhow::bail!("launchers_dir не может быть пустым");
        }

        if self.items.self_launcher.is_empty() || self.items.self_launcher.contains('/') {
            anyhow::bail!("Неверное имя лаунчера дока: '{}'", self.items.self_launcher);
        }

        // Валидация настроек матчера
        match self.matcher.backend.as_str() {
            "bamf" | "dry_run" => {}
            _ => anyhow::bail!("Неверный бэкенд матчера окон: {}", self.matcher.backend),
        }

        if self.matcher.emulation_interval_ms < 100 {
            anyhow::bail!("emulation_interval_ms должно быть минимум 100");
        }

        // Запасные приложения должны быть абсолютными путями
        for (i, category) in self.defaults.fallback_categories().iter().enumerate() {
            for candidate in category {
                if !candidate.is_absolute() {
                    anyhow::bail!(
                        "Запасное приложение {:?} в категории #{} должно быть абсолютным путём",
                        candidate,
                        i + 1
                    );
                }
            }
        }

        Ok(())
    }

    /// Каталог лаунчеров с раскрытием значения "auto"
    pub fn launchers_dir(&self) -> Result<PathBuf> {
        if self.items.launchers_dir != "auto" {
            return Ok(PathBuf::from(&self.items.launchers_dir));
        }

        let config_dir = dirs::config_dir()
            .context("Не удалось определить каталог конфигурации пользователя")?;
        Ok(config_dir.join("rdock").join("launchers"))
    }
}
