//! WindowMatcher service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for observing running
//! applications and windows through an external matcher and republishing its
//! notifications as DockEvent(s). Handles are owned by the external service; the
//! matcher never manages their lifecycle. Dock item loading and ordering live in
//! `crate::items`.

mod bamf;
mod dry_run;
mod window_matcher;
mod r#trait;

pub use self::r#trait::create_window_tracker;
pub use self::window_matcher::WindowMatcher;
