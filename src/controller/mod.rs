//! Screen controllers
//!
//! Each controller owns one screen's snapshot and the repository
//! subscription that feeds it:
//! - `GalleryController` - expenses with photos
//! - `DailyController` - expenses of one calendar day

pub mod daily;
pub mod gallery;

pub use daily::DailyController;
pub use gallery::GalleryController;
