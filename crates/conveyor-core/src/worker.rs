//! Worker: consumes messages, executes tasks, records outcomes.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::app::App;
use crate::domain::{Message, Outcome, TaskState};
use crate::ports::ResultBackend;

/// Worker tuning knobs.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Upper bound on one `consume` wait; also the shutdown latency when the
    /// queue is idle.
    pub consume_timeout: Duration,

    /// Override for `task_track_started`; `None` follows the app config.
    pub track_started: Option<bool>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            consume_timeout: Duration::from_millis(100),
            track_started: None,
        }
    }
}

/// Single consumer loop over the app's broker.
///
/// Lifecycle is Stopped -> Running -> Stopped: `start` spawns the loop (and
/// is a no-op while one is running), `stop` flips a watch flag and waits.
/// Shutdown is cooperative: an in-flight message finishes before the loop
/// exits.
///
/// A multi-worker deployment is just several `Worker` values sharing the
/// same app; the broker's internal lock prevents double delivery.
pub struct Worker {
    app: App,
    config: WorkerConfig,
    shutdown_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    pub fn new(app: App) -> Self {
        Self::with_config(app, WorkerConfig::default())
    }

    pub fn with_config(app: App, config: WorkerConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            app,
            config,
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the consumer loop. Idempotent while running; after a `stop` the
    /// worker can be started again. Must be called from within a tokio
    /// runtime.
    pub fn start(&self) {
        let mut handle = self.handle.lock().expect("worker handle lock poisoned");
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let _ = self.shutdown_tx.send(false);
        let shutdown_rx = self.shutdown_tx.subscribe();
        let app = self.app.clone();
        let config = self.config.clone();
        *handle = Some(tokio::spawn(run_loop(app, config, shutdown_rx)));
        info!("worker started");
    }

    /// Signal the loop to exit without waiting. Safe from any context.
    pub fn request_stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Signal the loop to exit and wait for it. The in-flight message, if
    /// any, completes first.
    pub async fn stop(&self) {
        self.request_stop();
        let handle = self
            .handle
            .lock()
            .expect("worker handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
            info!("worker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .expect("worker handle lock poisoned")
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

async fn run_loop(app: App, config: WorkerConfig, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // consume() can wait, so race it against shutdown.
        let consumed = tokio::select! {
            _ = shutdown_rx.changed() => continue,
            consumed = app.broker().consume(Some(config.consume_timeout)) => consumed,
        };

        let message = match consumed {
            Ok(Some(message)) => message,
            // Empty poll; consume() already waited, no extra sleep needed.
            Ok(None) => continue,
            Err(e) => {
                error!(error = %e, "broker consume failed");
                continue;
            }
        };

        process_message(&app, &config, message).await;
    }
}

/// Handle one message to completion. Everything that can go wrong here is a
/// per-message failure: it ends up in the backend, never kills the loop.
async fn process_message(app: &App, config: &WorkerConfig, message: Message) {
    let id = message.id();
    let backend = app.backend();

    let Some(task) = app.task(message.name()) else {
        warn!(%id, name = message.name(), "message names an unregistered task");
        store_or_log(
            backend,
            id,
            Outcome::error(format!("task not registered: {}", message.name())),
            TaskState::Failure,
        )
        .await;
        return;
    };

    // Revoked while still queued: skip execution. The terminal REVOKED
    // record already answers any waiting `get`.
    match backend.get_result(id).await {
        Ok(record) if record.state == TaskState::Revoked => {
            debug!(%id, name = message.name(), "skipping revoked task");
            return;
        }
        Ok(_) => {}
        Err(e) => error!(error = %e, %id, "backend read failed, executing anyway"),
    }

    let track_started = config
        .track_started
        .unwrap_or(app.config().task_track_started);
    if track_started {
        store_or_log(backend, id, Outcome::None, TaskState::Started).await;
    }

    debug!(%id, name = message.name(), "executing");
    match task.call(message.args(), message.kwargs()).await {
        Ok(value) => {
            store_or_log(backend, id, Outcome::Value(value), TaskState::Success).await;
        }
        Err(reason) => {
            warn!(%id, name = message.name(), %reason, "task body failed");
            store_or_log(backend, id, Outcome::Error(reason), TaskState::Failure).await;
        }
    }
}

/// A failed `store_result` is surfaced loudly and the loop moves on; the
/// result for that id is lost, not the worker.
async fn store_or_log(
    backend: &std::sync::Arc<dyn ResultBackend>,
    id: crate::domain::TaskId,
    value: Outcome,
    state: TaskState,
) {
    if let Err(e) = backend.store_result(id, value, state).await {
        error!(error = %e, %id, ?state, "failed to store result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppBuilder, AppConfig};
    use crate::domain::{Kwargs, TaskId};
    use crate::error::ConveyorError;
    use crate::task::{FnTask, Task, TaskFn};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    const GENEROUS: Duration = Duration::from_secs(5);

    fn add(args: &[Value], _kwargs: &Kwargs) -> Result<Value, String> {
        let a = args[0].as_i64().ok_or("bad args")?;
        let b = args[1].as_i64().ok_or("bad args")?;
        Ok(json!(a + b))
    }

    fn boom(_args: &[Value], _kwargs: &Kwargs) -> Result<Value, String> {
        Err("x".to_string())
    }

    struct Slow(Duration);

    #[async_trait]
    impl TaskFn for Slow {
        async fn call(
            &self,
            _task: Option<&Task>,
            _args: &[Value],
            _kwargs: &Kwargs,
        ) -> Result<Value, String> {
            tokio::time::sleep(self.0).await;
            Ok(json!("done"))
        }
    }

    fn app() -> App {
        AppBuilder::new()
            .register("demo.add", FnTask::new(add))
            .unwrap()
            .register("demo.boom", FnTask::new(boom))
            .unwrap()
            .register("demo.slow", Slow(Duration::from_millis(200)))
            .unwrap()
            .build()
    }

    #[tokio::test]
    async fn round_trip_through_a_running_worker() {
        let app = app();
        let worker = Worker::new(app.clone());
        worker.start();

        let result = app
            .task("demo.add")
            .unwrap()
            .delay(vec![json!(2), json!(3)])
            .await
            .unwrap();

        assert_eq!(result.get(Some(GENEROUS)).await.unwrap(), json!(5));
        assert_eq!(result.state().await.unwrap(), TaskState::Success);

        worker.stop().await;
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn failure_is_captured_and_resurfaced() {
        let app = app();
        let worker = Worker::new(app.clone());
        worker.start();

        let result = app.task("demo.boom").unwrap().delay(vec![]).await.unwrap();

        let err = result.get(Some(GENEROUS)).await.unwrap_err();
        assert!(matches!(err, ConveyorError::TaskFailed { reason, .. } if reason == "x"));
        assert_eq!(result.state().await.unwrap(), TaskState::Failure);

        worker.stop().await;
    }

    #[tokio::test]
    async fn unregistered_task_fails_the_message_not_the_worker() {
        let app = app();
        let worker = Worker::new(app.clone());
        worker.start();

        // Bypass the registry check in send_task by publishing directly.
        let bad_id = TaskId::new();
        app.broker()
            .publish(Message::new(bad_id, "demo.missing", vec![], Kwargs::new()))
            .await
            .unwrap();

        let bad = app.async_result(bad_id);
        let err = bad.get(Some(GENEROUS)).await.unwrap_err();
        assert!(
            matches!(err, ConveyorError::TaskFailed { reason, .. }
                if reason.contains("task not registered"))
        );

        // The loop survived: a later message still executes.
        let good = app
            .task("demo.add")
            .unwrap()
            .delay(vec![json!(1), json!(1)])
            .await
            .unwrap();
        assert_eq!(good.get(Some(GENEROUS)).await.unwrap(), json!(2));

        worker.stop().await;
    }

    #[tokio::test]
    async fn single_worker_preserves_fifo_completion_order() {
        let app = app();
        let task = app.task("demo.add").unwrap();

        // Publish all three before starting the worker so they queue up.
        let r1 = task.delay(vec![json!(1), json!(0)]).await.unwrap();
        let r2 = task.delay(vec![json!(2), json!(0)]).await.unwrap();
        let r3 = task.delay(vec![json!(3), json!(0)]).await.unwrap();

        let worker = Worker::new(app.clone());
        worker.start();

        r3.get(Some(GENEROUS)).await.unwrap();
        r2.get(Some(GENEROUS)).await.unwrap();
        r1.get(Some(GENEROUS)).await.unwrap();
        worker.stop().await;

        let t1 = app.backend().get_result(r1.id()).await.unwrap().recorded_at;
        let t2 = app.backend().get_result(r2.id()).await.unwrap().recorded_at;
        let t3 = app.backend().get_result(r3.id()).await.unwrap().recorded_at;
        assert!(t1 <= t2 && t2 <= t3);
    }

    #[tokio::test]
    async fn revoked_before_execution_is_skipped() {
        let app = app();
        let task = app.task("demo.add").unwrap();

        // No worker yet: the message sits in the queue.
        let result = task.delay(vec![json!(1), json!(1)]).await.unwrap();
        result.revoke().await.unwrap();

        let worker = Worker::new(app.clone());
        worker.start();

        let err = result.get(Some(GENEROUS)).await.unwrap_err();
        assert!(matches!(err, ConveyorError::Revoked(_)));
        assert_eq!(result.state().await.unwrap(), TaskState::Revoked);

        worker.stop().await;
    }

    #[tokio::test]
    async fn started_is_recorded_when_tracking_is_on() {
        let app = AppBuilder::new()
            .config(AppConfig {
                task_track_started: true,
                ..AppConfig::default()
            })
            .register("demo.slow", Slow(Duration::from_millis(200)))
            .unwrap()
            .build();
        let worker = Worker::new(app.clone());
        worker.start();

        let result = app.task("demo.slow").unwrap().delay(vec![]).await.unwrap();

        // The body sleeps long enough for the STARTED record to be visible.
        let mut saw_started = false;
        let deadline = tokio::time::Instant::now() + GENEROUS;
        while tokio::time::Instant::now() < deadline {
            match result.state().await.unwrap() {
                TaskState::Started => {
                    saw_started = true;
                    break;
                }
                TaskState::Success => break,
                _ => tokio::time::sleep(Duration::from_millis(5)).await,
            }
        }
        assert!(saw_started, "never observed STARTED");

        assert_eq!(result.get(Some(GENEROUS)).await.unwrap(), json!("done"));
        worker.stop().await;
    }

    #[tokio::test]
    async fn stop_lets_the_inflight_message_finish() {
        let app = app();
        let worker = Worker::new(app.clone());
        worker.start();

        let result = app.task("demo.slow").unwrap().delay(vec![]).await.unwrap();

        // Give the worker time to pick the message up, then stop mid-flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.stop().await;

        assert_eq!(result.state().await.unwrap(), TaskState::Success);
    }

    #[tokio::test]
    async fn start_is_idempotent_while_running() {
        let app = app();
        let worker = Worker::new(app.clone());
        worker.start();
        worker.start();
        assert!(worker.is_running());

        let result = app
            .task("demo.add")
            .unwrap()
            .delay(vec![json!(4), json!(4)])
            .await
            .unwrap();
        assert_eq!(result.get(Some(GENEROUS)).await.unwrap(), json!(8));

        worker.stop().await;
    }

    #[tokio::test]
    async fn worker_can_be_restarted_after_stop() {
        let app = app();
        let worker = Worker::new(app.clone());

        worker.start();
        worker.stop().await;
        assert!(!worker.is_running());

        worker.start();
        assert!(worker.is_running());
        let result = app
            .task("demo.add")
            .unwrap()
            .delay(vec![json!(2), json!(2)])
            .await
            .unwrap();
        assert_eq!(result.get(Some(GENEROUS)).await.unwrap(), json!(4));
        worker.stop().await;
    }

    #[tokio::test]
    async fn two_workers_share_one_queue_without_double_delivery() {
        let app = app();
        let task = app.task("demo.add").unwrap();

        let mut results = Vec::new();
        for i in 0..20 {
            results.push(task.delay(vec![json!(i), json!(1)]).await.unwrap());
        }

        let w1 = Worker::new(app.clone());
        let w2 = Worker::new(app.clone());
        w1.start();
        w2.start();

        for (i, result) in results.iter().enumerate() {
            let value = result.get(Some(GENEROUS)).await.unwrap();
            assert_eq!(value, json!(i as i64 + 1));
        }

        w1.stop().await;
        w2.stop().await;
    }
}
