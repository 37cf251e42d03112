pub mod toml_loader;

pub use toml_loader::{load_watch_file, parse_watch_file, CourseEntry, WatchFile};
