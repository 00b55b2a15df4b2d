use crate::config::Config;
use crate::error::{DockError, Result};
use crate::events::{AppInfo, TrackerEvent};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Duration;

/// Trait for external services that track running applications and windows
#[async_trait::async_trait]
pub trait WindowTracker: Send + Sync {
    /// Subscribe to the four matcher notifications, delivering them into `sink`
    async fn connect(&self, sink: UnboundedSender<TrackerEvent>) -> Result<()>;

    /// Drop every subscription made by `connect`
    async fn disconnect(&self) -> Result<()>;

    async fn running_applications(&self) -> Result<Vec<AppInfo>>;

    async fn register_favorites(&self, favorites: &[String]) -> Result<()>;
}

/// Factory function to create an appropriate tracker based on the config and the dry_run flag
pub async fn create_window_tracker(
    config: Arc<Config>,
    dry_run: bool,
) -> Result<Arc<dyn WindowTracker>> {
    let backend = if dry_run { "dry_run" } else { config.matcher.backend.as_str() };

    match backend {
        "dry_run" => {
            let interval = Duration::from_millis(config.matcher.emulation_interval_ms);
            Ok(Arc::new(
                super::dry_run::DryRunTracker::with_sample_applications().with_emulation(interval),
            ))
        }
        "bamf" => Ok(Arc::new(super::bamf::BamfTracker::new().await?)),
        other => DockError::service_unavailable(format!("Неизвестный бэкенд матчера окон: {}", other)),
    }
}
