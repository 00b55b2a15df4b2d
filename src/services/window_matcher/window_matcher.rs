use crate::error::Result;
use crate::events::{AppInfo, DockEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::r#trait::WindowTracker;

const EVENT_CAPACITY: usize = 64;

/// Republishes the tracker's notifications as `DockEvent`s.
///
/// Owned by the application's root context. `close()` must be called on shutdown:
/// it unsubscribes from the tracker before the tracker reference is released.
pub struct WindowMatcher {
    tracker: Arc<dyn WindowTracker>,
    events: broadcast::Sender<DockEvent>,
    forwarder: Option<JoinHandle<()>>,
}

impl WindowMatcher {
    pub async fn open(tracker: Arc<dyn WindowTracker>) -> Result<Self> {
        info!("Инициализация WindowMatcher");

        let (sink, mut source) = mpsc::unbounded_channel();
        tracker.connect(sink).await?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let publisher = events.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = source.recv().await {
                let event = DockEvent::from(event);
                debug!("Событие матчера: {}", event);
                // Отсутствие подписчиков не ошибка
                let _ = publisher.send(event);
            }
        });

        Ok(Self {
            tracker,
            events,
            forwarder: Some(forwarder),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DockEvent> {
        self.events.subscribe()
    }

    pub async fn running_applications(&self) -> Result<Vec<AppInfo>> {
        self.tracker.running_applications().await
    }

    /// Первое запущенное приложение, чей .desktop файл совпадает с `uri`
    pub async fn app_for_uri(&self, uri: &str) -> Result<Option<AppInfo>> {
        let applications = self.tracker.running_applications().await?;
        Ok(applications
            .into_iter()
            .find(|app| app.desktop_file.as_deref() == Some(uri)))
    }

    pub async fn set_favorites(&self, favorites: &[String]) {
        if let Err(e) = self.tracker.register_favorites(favorites).await {
            warn!("Не удалось передать избранное матчеру окон: {}", e);
        }
    }

    pub async fn close(mut self) -> Result<()> {
        info!("WindowMatcher завершает работу");

        let result = self.tracker.disconnect().await;
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        result
    }
}

impl Drop for WindowMatcher {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            warn!("WindowMatcher освобождён без close(), подписки матчера остаются активными");
            forwarder.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{TrackerEvent, View, WindowInfo};
    use crate::services::window_matcher::dry_run::DryRunTracker;

    fn tracker() -> Arc<DryRunTracker> {
        Arc::new(DryRunTracker::new(vec![
            AppInfo::new("/app/1", "Terminal").with_desktop_file("/usr/share/applications/xterm.desktop"),
            AppInfo::new("/app/2", "Files"),
            AppInfo::new("/app/3", "Terminal 2").with_desktop_file("/usr/share/applications/xterm.desktop"),
        ]))
    }

    #[tokio::test]
    async fn test_view_events_are_republished_by_kind() {
        let tracker = tracker();
        let matcher = WindowMatcher::open(tracker.clone()).await.unwrap();
        let mut events = matcher.subscribe();

        let window = WindowInfo::new("/window/1", "xterm");
        let app = AppInfo::new("/app/2", "Files");
        assert!(tracker.emit(TrackerEvent::ViewOpened(View::Window(window.clone()))));
        assert!(tracker.emit(TrackerEvent::ViewClosed(View::Application(app.clone()))));

        assert_eq!(events.recv().await.unwrap(), DockEvent::WindowOpened(window));
        assert_eq!(events.recv().await.unwrap(), DockEvent::AppClosed(app));

        matcher.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_app_for_uri_returns_first_match() {
        let matcher = WindowMatcher::open(tracker()).await.unwrap();

        let found = matcher
            .app_for_uri("/usr/share/applications/xterm.desktop")
            .await
            .unwrap();
        assert_eq!(found.map(|app| app.id), Some("/app/1".to_string()));

        let missing = matcher
            .app_for_uri("/usr/share/applications/vlc.desktop")
            .await
            .unwrap();
        assert!(missing.is_none());

        assert_eq!(matcher.running_applications().await.unwrap().len(), 3);
        matcher.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_favorites_reaches_tracker() {
        let tracker = tracker();
        let matcher = WindowMatcher::open(tracker.clone()).await.unwrap();

        let favorites = vec![
            "/usr/share/applications/firefox.desktop".to_string(),
            "/usr/share/applications/xterm.desktop".to_string(),
        ];
        matcher.set_favorites(&favorites).await;

        assert_eq!(tracker.favorites(), favorites);
        matcher.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_unsubscribes_from_tracker() {
        let tracker = tracker();
        let matcher = WindowMatcher::open(tracker.clone()).await.unwrap();

        matcher.close().await.unwrap();

        let event = TrackerEvent::ActiveWindowChanged { old: None, new: None };
        assert!(!tracker.emit(event));
    }
}
