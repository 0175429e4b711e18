//! Demo wiring: register tasks, start a worker, submit, wait, shut down.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::info;

use conveyor_core::{AppBuilder, ConveyorError, FnTask, Kwargs, Worker};

fn add(args: &[Value], _kwargs: &Kwargs) -> Result<Value, String> {
    let a = args[0].as_i64().ok_or("args[0] must be an integer")?;
    let b = args[1].as_i64().ok_or("args[1] must be an integer")?;
    Ok(json!(a + b))
}

fn greet(_args: &[Value], kwargs: &Kwargs) -> Result<Value, String> {
    let name = kwargs
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("world");
    Ok(json!(format!("hello, {name}!")))
}

fn flaky(_args: &[Value], _kwargs: &Kwargs) -> Result<Value, String> {
    Err("intentional failure".to_string())
}

#[tokio::main]
async fn main() -> Result<(), ConveyorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // (A) Build the app: registry + in-memory broker/backend.
    let app = AppBuilder::new()
        .register("demo.add", FnTask::new(add))?
        .register("demo.greet", FnTask::new(greet))?
        .register("demo.flaky", FnTask::new(flaky))?
        .build();
    info!(tasks = ?app.task_names(), "app built");

    // (B) Start one worker.
    let worker = Worker::new(app.clone());
    worker.start();

    // (C) Submit and block on the handles.
    let sum = app
        .task("demo.add")
        .expect("registered above")
        .delay(vec![json!(2), json!(3)])
        .await?;
    info!(id = %sum.id(), "submitted demo.add");
    let value = sum.get(Some(Duration::from_secs(5))).await?;
    info!(%value, state = ?sum.state().await?, "demo.add finished");

    let mut kwargs = Kwargs::new();
    kwargs.insert("name".to_string(), json!("conveyor"));
    let greeting = app.send_task("demo.greet", vec![], kwargs).await?;
    let value = greeting.get(Some(Duration::from_secs(5))).await?;
    info!(%value, "demo.greet finished");

    // (D) A failing task: the error comes back through the handle, the
    // worker keeps running.
    let broken = app.task("demo.flaky").expect("registered above").delay(vec![]).await?;
    match broken.get(Some(Duration::from_secs(5))).await {
        Ok(value) => info!(%value, "demo.flaky unexpectedly succeeded"),
        Err(e) => info!(error = %e, "demo.flaky failed as designed"),
    }

    // (E) Graceful shutdown.
    worker.stop().await;
    Ok(())
}
