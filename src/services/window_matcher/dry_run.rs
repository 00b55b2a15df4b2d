use crate::error::Result;
use crate::events::{AppInfo, TrackerEvent, View, WindowInfo};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use super::r#trait::WindowTracker;

/// Emulated matcher: a fixed set of applications and manually pushed events
pub struct DryRunTracker {
    applications: Vec<AppInfo>,
    emulation_interval: Option<Duration>,
    sink: Mutex<Option<UnboundedSender<TrackerEvent>>>,
    favorites: Mutex<Vec<String>>,
    emulation: Mutex<Option<JoinHandle<()>>>,
}

impl DryRunTracker {
    pub fn new(applications: Vec<AppInfo>) -> Self {
        Self {
            applications,
            emulation_interval: None,
            sink: Mutex::new(None),
            favorites: Mutex::new(Vec::new()),
            emulation: Mutex::new(None),
        }
    }

    pub fn with_sample_applications() -> Self {
        let applications = [
            ("terminal", "Terminal", "/usr/share/applications/xterm.desktop"),
            ("browser", "Browser", "/usr/share/applications/firefox.desktop"),
            ("editor", "Editor", ""),
        ]
        .iter()
        .map(|(id, name, desktop_file)| {
            AppInfo::new(format!("/dry_run/application/{}", id), *name).with_desktop_file(*desktop_file)
        })
        .collect();

        Self::new(applications)
    }

    /// Periodically switch the active application while connected
    pub fn with_emulation(mut self, every: Duration) -> Self {
        self.emulation_interval = Some(every);
        self
    }

    /// Push an event to the connected sink; `false` when nobody is connected
    #[allow(dead_code)]
    pub fn emit(&self, event: TrackerEvent) -> bool {
        match self.sink.lock().as_ref() {
            Some(sink) => sink.send(event).is_ok(),
            None => false,
        }
    }

    #[allow(dead_code)]
    pub fn favorites(&self) -> Vec<String> {
        self.favorites.lock().clone()
    }

    fn spawn_emulation(&self, every: Duration, sink: UnboundedSender<TrackerEvent>) -> JoinHandle<()> {
        let applications = self.applications.clone();

        tokio::spawn(async move {
            if applications.is_empty() {
                return;
            }

            let mut ticker = interval(every);
            let mut current: Option<AppInfo> = None;

            for (index, app) in applications.iter().cycle().enumerate() {
                ticker.tick().await;

                info!("Dry-run: эмулируем смену приложения на: {}", app);
                let window = WindowInfo::new(format!("/dry_run/window/{}", index), app.name.clone())
                    .with_class("DryRun");

                let events = [
                    TrackerEvent::ViewOpened(View::Window(window.clone())),
                    TrackerEvent::ActiveApplicationChanged {
                        old: current.replace(app.clone()),
                        new: Some(app.clone()),
                    },
                    TrackerEvent::ViewClosed(View::Window(window)),
                ];

                for event in events {
                    if sink.send(event).is_err() {
                        return;
                    }
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl WindowTracker for DryRunTracker {
    async fn connect(&self, sink: UnboundedSender<TrackerEvent>) -> Result<()> {
        info!(
            "Dry-run режим - матчер окон работает в режиме эмуляции ({} приложений)",
            self.applications.len()
        );

        if let Some(every) = self.emulation_interval {
            let handle = self.spawn_emulation(every, sink.clone());
            if let Some(previous) = self.emulation.lock().replace(handle) {
                previous.abort();
            }
        }

        *self.sink.lock() = Some(sink);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        debug!("Dry-run: отписка от уведомлений");
        if let Some(handle) = self.emulation.lock().take() {
            handle.abort();
        }
        self.sink.lock().take();
        Ok(())
    }

    async fn running_applications(&self) -> Result<Vec<AppInfo>> {
        Ok(self.applications.clone())
    }

    async fn register_favorites(&self, favorites: &[String]) -> Result<()> {
        debug!("Dry-run: избранное ({} элементов): {:?}", favorites.len(), favorites);
        *self.favorites.lock() = favorites.to_vec();
        Ok(())
    }
}
