pub mod watch_cycle;

pub use watch_cycle::{CycleOptions, WatchCycle};
