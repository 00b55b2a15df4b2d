use super::window::{AppInfo, View, WindowInfo};
use std::fmt;

/// Сырые уведомления внешнего матчера окон
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    ActiveApplicationChanged {
        old: Option<AppInfo>,
        new: Option<AppInfo>,
    },
    ActiveWindowChanged {
        old: Option<WindowInfo>,
        new: Option<WindowInfo>,
    },
    ViewOpened(View),
    ViewClosed(View),
}

/// События, которые док публикует своим подписчикам
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockEvent {
    WindowChanged {
        old: Option<WindowInfo>,
        new: Option<WindowInfo>,
    },
    WindowOpened(WindowInfo),
    WindowClosed(WindowInfo),
    AppChanged {
        old: Option<AppInfo>,
        new: Option<AppInfo>,
    },
    AppOpened(AppInfo),
    AppClosed(AppInfo),
}

impl From<TrackerEvent> for DockEvent {
    fn from(event: TrackerEvent) -> Self {
        match event {
            TrackerEvent::ActiveApplicationChanged { old, new } => DockEvent::AppChanged { old, new },
            TrackerEvent::ActiveWindowChanged { old, new } => DockEvent::WindowChanged { old, new },
            TrackerEvent::ViewOpened(View::Window(window)) => DockEvent::WindowOpened(window),
            TrackerEvent::ViewOpened(View::Application(app)) => DockEvent::AppOpened(app),
            TrackerEvent::ViewClosed(View::Window(window)) => DockEvent::WindowClosed(window),
            TrackerEvent::ViewClosed(View::Application(app)) => DockEvent::AppClosed(app),
        }
    }
}

fn or_none<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "None".to_string())
}

impl fmt::Display for DockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockEvent::WindowChanged { old, new } => {
                write!(f, "window-changed: {} -> {}", or_none(old), or_none(new))
            }
            DockEvent::WindowOpened(window) => write!(f, "window-opened: {}", window),
            DockEvent::WindowClosed(window) => write!(f, "window-closed: {}", window),
            DockEvent::AppChanged { old, new } => {
                write!(f, "app-changed: {} -> {}", or_none(old), or_none(new))
            }
            DockEvent::AppOpened(app) => write!(f, "app-opened: {}", app),
            DockEvent::AppClosed(app) => write!(f, "app-closed: {}", app),
        }
    }
}
