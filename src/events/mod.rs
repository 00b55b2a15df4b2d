pub mod dock;
pub mod window;

pub use dock::{DockEvent, TrackerEvent};
pub use window::{AppInfo, View, WindowInfo};
