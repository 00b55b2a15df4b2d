use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Непрозрачный идентификатор окна во внешнем сервисе (путь объекта D-Bus)
    pub id: String,
    pub title: String,
    pub class: String,
    pub pid: Option<u32>,
}

impl WindowInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            class: String::new(),
            pid: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

/// Информация о запущенном приложении
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    /// Путь к .desktop файлу приложения, если сервис его знает
    pub desktop_file: Option<String>,
}

impl AppInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            desktop_file: None,
        }
    }

    pub fn with_desktop_file(mut self, desktop_file: impl Into<String>) -> Self {
        let desktop_file = desktop_file.into();
        self.desktop_file = (!desktop_file.is_empty()).then_some(desktop_file);
        self
    }
}

impl fmt::Display for AppInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.desktop_file {
            Some(desktop_file) => write!(f, "\"{}\" ({})", self.name, desktop_file),
            None => write!(f, "\"{}\"", self.name),
        }
    }
}

/// Открытый или закрытый объект матчера: окно либо приложение
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Window(WindowInfo),
    Application(AppInfo),
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Window(window) => write!(f, "окно {}", window),
            View::Application(app) => write!(f, "приложение {}", app),
        }
    }
}
