use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::{error, info};
use crate::error::{Error, Result};

/// Tracks named background tasks so they can be checked and drained.
///
/// ## Usage
/// ```no_run
/// # use token_infra::utils::task_supervisor::TaskSupervisor;
/// # async fn demo() {
/// let mut supervisor = TaskSupervisor::new();
/// supervisor.spawn("metrics_refresh", async move {
///     // loop until shutdown
/// });
///
/// // on shutdown, after signalling the loops to stop
/// supervisor.join_all().await;
/// # }
/// ```
#[derive(Default)]
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a background task and register it under `name`.
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        self.tasks.insert(name, handle);
        self
    }

    /// Errors while any registered task has terminated. Loops are expected to
    /// run until shutdown, so a dead one keeps being reported.
    pub fn check_health(&self) -> Result<()> {
        let mut finished: Vec<&str> = self.tasks.iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.as_str())
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        finished.sort_unstable();
        let msg = format!("Tasks terminated unexpectedly: {:?}", finished);
        error!("{}", msg);
        Err(Error::TaskFailed(msg))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every task to finish on its own. Callers signal shutdown first.
    pub async fn join_all(&mut self) -> Result<()> {
        let mut failed = Vec::new();
        for (name, handle) in self.tasks.drain() {
            match handle.await {
                Ok(()) => info!("Task {} completed", name),
                Err(e) => {
                    error!("Task {} failed: {}", name, e);
                    failed.push(name);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::TaskFailed(format!("{:?}", failed)))
        }
    }
}
