// Library surface for the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod celebration;
pub mod config;
pub mod game;
pub mod leaderboard;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod storage;
pub mod ui;
pub mod util;
