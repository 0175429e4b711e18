//! App configuration.
//!
//! The core only consumes resolved values; loading them (files, env, CLI) is
//! the caller's concern.

/// Resolved configuration of an app.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Run submissions synchronously in the caller, bypassing the broker.
    pub task_always_eager: bool,

    /// Record STARTED before a worker executes a task.
    pub task_track_started: bool,

    /// Opaque identifier of the broker this app talks to. The core never
    /// interprets it; construction of a concrete broker happens outside.
    pub broker_url: Option<String>,

    /// Opaque identifier of the result backend, same rules as `broker_url`.
    pub result_backend: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            task_always_eager: false,
            task_track_started: false,
            broker_url: None,
            result_backend: None,
        }
    }
}

impl AppConfig {
    /// Eager-mode config, the common testing setup.
    pub fn eager() -> Self {
        Self {
            task_always_eager: true,
            ..Self::default()
        }
    }
}
