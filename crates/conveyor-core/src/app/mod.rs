//! App layer: registry, configuration, and the submission API.
//!
//! - [`AppBuilder`]: registration and wiring (broker/backend/config).
//! - [`App`]: immutable runtime handle shared by callers and workers.
//! - [`TaskHandle`]: per-task submission surface (`delay` / `apply_async`).

pub mod builder;
pub mod config;
pub mod core;

pub use builder::AppBuilder;
pub use config::AppConfig;
pub use core::{App, ApplyOptions, TaskHandle};
