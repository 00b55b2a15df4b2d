pub mod window_matcher;

pub use window_matcher::{create_window_tracker, WindowMatcher};
