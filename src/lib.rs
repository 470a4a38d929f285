pub mod api;
#[cfg(feature = "gui")]
pub mod gui;
pub mod logging;
pub mod roi;
pub mod session;
pub mod settings;
pub mod submission;
pub mod thumbnail;
pub mod video_loader;
pub mod youtube;
