//! `labinv` command-line application: configuration, wiring and handlers.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;

pub use app::LabApp;
pub use config::AppConfig;
