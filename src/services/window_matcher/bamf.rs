//! BAMF window matcher over the D-Bus session bus.
//!
//! The matcher object reports applications and windows as object paths. They are
//! resolved into `AppInfo` / `WindowInfo` right here, so the rest of the crate never
//! sees D-Bus types. `ViewOpened` / `ViewClosed` carry the view type as a string,
//! which becomes the `View` variant at this boundary.
//!
//! All four signals are read from one message stream by one task, and each is
//! resolved and sent before the next message is read, so events keep the order
//! in which BAMF emitted them.

use crate::error::Result;
use crate::events::{AppInfo, TrackerEvent, View, WindowInfo};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zbus::{message, proxy, Connection, MatchRule, Message, MessageStream};

use super::r#trait::WindowTracker;

const MATCHER_INTERFACE: &str = "org.ayatana.bamf.matcher";
const MATCHER_PATH: &str = "/org/ayatana/bamf/matcher";

#[proxy(
    interface = "org.ayatana.bamf.matcher",
    default_service = "org.ayatana.bamf",
    default_path = "/org/ayatana/bamf/matcher"
)]
trait BamfMatcher {
    fn running_applications(&self) -> zbus::Result<Vec<String>>;

    fn register_favorites(&self, favorites: &[&str]) -> zbus::Result<()>;
}

#[proxy(interface = "org.ayatana.bamf.view", default_service = "org.ayatana.bamf")]
trait BamfView {
    fn name(&self) -> zbus::Result<String>;
}

#[proxy(interface = "org.ayatana.bamf.application", default_service = "org.ayatana.bamf")]
trait BamfApplication {
    fn desktop_file(&self) -> zbus::Result<String>;
}

#[proxy(interface = "org.ayatana.bamf.window", default_service = "org.ayatana.bamf")]
trait BamfWindow {
    fn get_pid(&self) -> zbus::Result<u32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewKind {
    Application,
    Window,
}

/// Вид представления по строке типа из `ViewOpened` / `ViewClosed`
fn view_kind(view_type: &str) -> Option<ViewKind> {
    match view_type {
        "application" => Some(ViewKind::Application),
        "window" => Some(ViewKind::Window),
        _ => None,
    }
}

/// Пустой путь объекта означает "нет представления"
fn object_path(path: &str) -> Option<&str> {
    (!path.is_empty()).then_some(path)
}

/// Сигнал матчера до разрешения путей объектов
#[derive(Debug, Clone, PartialEq, Eq)]
enum Notification {
    ApplicationChanged { old: String, new: String },
    WindowChanged { old: String, new: String },
    Opened { path: String, kind: ViewKind },
    Closed { path: String, kind: ViewKind },
}

impl Notification {
    fn decode(member: &str, first: String, second: String) -> Option<Self> {
        match member {
            "ActiveApplicationChanged" => Some(Self::ApplicationChanged { old: first, new: second }),
            "ActiveWindowChanged" => Some(Self::WindowChanged { old: first, new: second }),
            "ViewOpened" => view_kind(&second).map(|kind| Self::Opened { path: first, kind }),
            "ViewClosed" => view_kind(&second).map(|kind| Self::Closed { path: first, kind }),
            _ => None,
        }
    }

    fn from_message(message: &Message) -> Option<Self> {
        let header = message.header();
        let member = header.member()?.to_string();

        let (first, second) = match message.body().deserialize::<(String, String)>() {
            Ok(args) => args,
            Err(e) => {
                debug!("Неожиданные аргументы сигнала {}: {}", member, e);
                return None;
            }
        };

        let notification = Self::decode(&member, first, second);
        if notification.is_none() {
            debug!("Игнорируем сигнал матчера {}", member);
        }
        notification
    }
}

/// Последние известные сведения о представлениях по пути объекта.
///
/// К моменту `ViewClosed` объект уже снят с шины, поэтому закрытое
/// представление берётся отсюда.
#[derive(Debug, Default)]
struct ViewCache {
    views: HashMap<String, View>,
}

impl ViewCache {
    fn remember(&mut self, view: &View) {
        let id = match view {
            View::Application(app) => &app.id,
            View::Window(window) => &window.id,
        };
        self.views.insert(id.clone(), view.clone());
    }

    fn forget(&mut self, path: &str, kind: ViewKind) -> Option<View> {
        match (self.views.remove(path)?, kind) {
            (view @ View::Application(_), ViewKind::Application) => Some(view),
            (view @ View::Window(_), ViewKind::Window) => Some(view),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct Resolver {
    connection: Connection,
    cache: Arc<Mutex<ViewCache>>,
}

impl Resolver {
    async fn view_name(&self, path: &str) -> Result<String> {
        let view = BamfViewProxy::builder(&self.connection)
            .path(path.to_owned())?
            .build()
            .await?;

        Ok(view.name().await.unwrap_or_default())
    }

    async fn app(&self, path: &str) -> Result<Option<AppInfo>> {
        let Some(path) = object_path(path) else {
            return Ok(None);
        };

        let name = self.view_name(path).await?;
        let application = BamfApplicationProxy::builder(&self.connection)
            .path(path.to_owned())?
            .build()
            .await?;
        let desktop_file = application.desktop_file().await.unwrap_or_default();

        let app = AppInfo::new(path, name).with_desktop_file(desktop_file);
        self.cache.lock().remember(&View::Application(app.clone()));
        Ok(Some(app))
    }

    async fn window(&self, path: &str) -> Result<Option<WindowInfo>> {
        let Some(path) = object_path(path) else {
            return Ok(None);
        };

        let title = self.view_name(path).await?;
        let window = BamfWindowProxy::builder(&self.connection)
            .path(path.to_owned())?
            .build()
            .await?;

        let info = WindowInfo::new(path, title);
        let info = match window.get_pid().await {
            Ok(pid) if pid != 0 => info.with_pid(pid),
            _ => info,
        };
        self.cache.lock().remember(&View::Window(info.clone()));
        Ok(Some(info))
    }

    async fn view(&self, path: &str, kind: ViewKind) -> Result<Option<View>> {
        Ok(match kind {
            ViewKind::Application => self.app(path).await?.map(View::Application),
            ViewKind::Window => self.window(path).await?.map(View::Window),
        })
    }

    async fn closed_view(&self, path: &str, kind: ViewKind) -> Result<Option<View>> {
        let cached = self.cache.lock().forget(path, kind);
        match cached {
            Some(view) => Ok(Some(view)),
            None => {
                let view = self.view(path, kind).await?;
                self.cache.lock().forget(path, kind);
                Ok(view)
            }
        }
    }

    async fn resolve(&self, notification: Notification) -> Result<Option<TrackerEvent>> {
        Ok(match notification {
            Notification::ApplicationChanged { old, new } => Some(TrackerEvent::ActiveApplicationChanged {
                old: self.app(&old).await.ok().flatten(),
                new: self.app(&new).await.ok().flatten(),
            }),
            Notification::WindowChanged { old, new } => Some(TrackerEvent::ActiveWindowChanged {
                old: self.window(&old).await.ok().flatten(),
                new: self.window(&new).await.ok().flatten(),
            }),
            Notification::Opened { path, kind } => self.view(&path, kind).await?.map(TrackerEvent::ViewOpened),
            Notification::Closed { path, kind } => {
                self.closed_view(&path, kind).await?.map(TrackerEvent::ViewClosed)
            }
        })
    }
}

pub struct BamfTracker {
    matcher: BamfMatcherProxy<'static>,
    resolver: Resolver,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl BamfTracker {
    pub async fn new() -> Result<Self> {
        info!("Подключение к BAMF через D-Bus");

        let connection = Connection::session().await?;
        let matcher = BamfMatcherProxy::new(&connection).await?;

        Ok(Self {
            matcher,
            resolver: Resolver {
                connection,
                cache: Arc::new(Mutex::new(ViewCache::default())),
            },
            listener: Mutex::new(None),
        })
    }

    async fn signal_stream(&self) -> Result<MessageStream> {
        let rule = MatchRule::builder()
            .msg_type(message::Type::Signal)
            .interface(MATCHER_INTERFACE)?
            .path(MATCHER_PATH)?
            .build();

        Ok(MessageStream::for_match_rule(rule, &self.resolver.connection, None).await?)
    }

    fn spawn_listener(
        mut stream: MessageStream,
        resolver: Resolver,
        sink: UnboundedSender<TrackerEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let message = match message {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Ошибка чтения сигнала BAMF: {}", e);
                        continue;
                    }
                };

                let Some(notification) = Notification::from_message(&message) else {
                    continue;
                };

                match resolver.resolve(notification).await {
                    Ok(Some(event)) => {
                        if sink.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Не удалось разрешить представление BAMF: {}", e),
                }
            }
            debug!("Поток сигналов BAMF завершён");
        })
    }
}

#[async_trait::async_trait]
impl WindowTracker for BamfTracker {
    async fn connect(&self, sink: UnboundedSender<TrackerEvent>) -> Result<()> {
        let stream = self.signal_stream().await?;
        let handle = Self::spawn_listener(stream, self.resolver.clone(), sink);
        info!("Подписка на уведомления BAMF активна");

        if let Some(previous) = self.listener.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(handle) = self.listener.lock().take() {
            debug!("Отписка от уведомлений BAMF");
            handle.abort();
        }
        Ok(())
    }

    async fn running_applications(&self) -> Result<Vec<AppInfo>> {
        let paths = self.matcher.running_applications().await?;
        let mut applications = Vec::with_capacity(paths.len());

        for path in paths {
            match self.resolver.app(&path).await {
                Ok(Some(app)) => applications.push(app),
                Ok(None) => {}
                Err(e) => warn!("Пропускаем приложение {}: {}", path, e),
            }
        }

        Ok(applications)
    }

    async fn register_favorites(&self, favorites: &[String]) -> Result<()> {
        let favorites: Vec<&str> = favorites.iter().map(String::as_str).collect();
        self.matcher.register_favorites(&favorites).await?;
        debug!("Передано {} избранных лаунчеров в BAMF", favorites.len());
        Ok(())
    }
}

impl Drop for BamfTracker {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
        info!("BamfTracker завершает работу");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: &str = "/org/ayatana/bamf/application/1";
    const WINDOW: &str = "/org/ayatana/bamf/window/7";

    #[test]
    fn test_view_kind_from_type_string() {
        assert_eq!(view_kind("application"), Some(ViewKind::Application));
        assert_eq!(view_kind("window"), Some(ViewKind::Window));
        assert_eq!(view_kind("tab"), None);
        assert_eq!(view_kind(""), None);
    }

    #[test]
    fn test_empty_object_path_is_none() {
        assert_eq!(object_path(""), None);
        assert_eq!(object_path(WINDOW), Some(WINDOW));
    }

    #[test]
    fn test_decode_matcher_signals() {
        assert_eq!(
            Notification::decode("ActiveWindowChanged", String::new(), WINDOW.to_string()),
            Some(Notification::WindowChanged {
                old: String::new(),
                new: WINDOW.to_string()
            })
        );
        assert_eq!(
            Notification::decode("ViewOpened", APP.to_string(), "application".to_string()),
            Some(Notification::Opened {
                path: APP.to_string(),
                kind: ViewKind::Application
            })
        );
        assert_eq!(
            Notification::decode("ViewClosed", WINDOW.to_string(), "window".to_string()),
            Some(Notification::Closed {
                path: WINDOW.to_string(),
                kind: ViewKind::Window
            })
        );
        assert_eq!(
            Notification::decode("ViewOpened", APP.to_string(), "tab".to_string()),
            None
        );
        assert_eq!(
            Notification::decode("StackingOrderChanged", String::new(), String::new()),
            None
        );
    }

    #[test]
    fn test_closed_view_comes_from_cache() {
        let mut cache = ViewCache::default();
        let app = AppInfo::new(APP, "XTerm").with_desktop_file("/usr/share/applications/xterm.desktop");
        let window = WindowInfo::new(WINDOW, "~").with_pid(4242);

        cache.remember(&View::Application(app.clone()));
        cache.remember(&View::Window(window.clone()));

        assert_eq!(cache.forget(APP, ViewKind::Application), Some(View::Application(app)));
        assert_eq!(cache.forget(APP, ViewKind::Application), None);
        assert_eq!(cache.forget(WINDOW, ViewKind::Window), Some(View::Window(window)));
    }

    #[test]
    fn test_cache_keeps_latest_and_checks_kind() {
        let mut cache = ViewCache::default();
        cache.remember(&View::Window(WindowInfo::new(WINDOW, "old title")));
        cache.remember(&View::Window(WindowInfo::new(WINDOW, "new title")));

        assert_eq!(
            cache.forget(WINDOW, ViewKind::Window),
            Some(View::Window(WindowInfo::new(WINDOW, "new title")))
        );

        cache.remember(&View::Window(WindowInfo::new(WINDOW, "title")));
        assert_eq!(cache.forget(WINDOW, ViewKind::Application), None);
    }
}
