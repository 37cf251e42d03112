pub mod catalog;
pub mod credentials;
pub mod found;
pub mod loaders;
pub mod watch_list;

pub use catalog::{Catalog, FacultyIndex};
pub use credentials::Credentials;
pub use found::FoundResult;
pub use loaders::{load_watch_file, WatchFile};
pub use watch_list::{CourseKey, SectionItem, SectionSpec, WatchList, WatchedCourses};
