pub mod api;
pub mod app;
pub mod config;
pub mod session;
pub mod storage;
pub mod ui;
pub mod utils;

pub use app::App;
pub use session::Session;
