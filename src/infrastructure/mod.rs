pub mod chromium;
pub mod driver;
pub mod navigator;

pub use chromium::ChromiumDriver;
pub use driver::{Locator, PortalDriver};
pub use navigator::Navigator;
