pub mod actions;
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod locale;
pub mod navigation;
