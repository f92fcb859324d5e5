// Library surface for headless/integration tests and reuse.
// main.rs only wires the terminal, CLI and logging around these modules.
pub mod app;
pub mod app_dirs;
pub mod classification;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod selection;
pub mod time_series;
pub mod ui;
pub mod view;
