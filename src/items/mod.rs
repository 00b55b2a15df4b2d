//! Dock items: `*.dockitem` launcher descriptors on disk.
//!
//! A descriptor is a tiny key-file naming one launcher (an application's .desktop
//! file, any other file, or the dock itself). Loading never fails as a whole:
//! unreadable directories, malformed descriptors and dangling launchers are
//! logged and left out of the result.

pub mod element;
pub mod factory;
pub mod keyfile;
pub mod loader;
pub mod ordering;
pub mod registry;
pub mod uri;

pub use element::{DockElement, ItemKind};
pub use factory::ItemFactory;
pub use registry::{DefaultAppRegistry, StaticRegistry, XdgMimeRegistry};
