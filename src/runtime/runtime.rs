//! 服务运行时实现

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use super::task::{SpawnTask, Task, TaskResult};

/// 停机等待上限
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
/// gRPC 端口可连接的等待上限
const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// 服务运行时
///
/// 启动所有任务，等待服务地址可连接，然后阻塞到关闭信号到来或任一任务提前退出，
/// 最后向所有任务发送关闭信号并在 `shutdown_timeout` 内等待它们结束。
pub struct ServiceRuntime {
    service_name: String,
    service_address: Option<SocketAddr>,
    tasks: Vec<Box<dyn Task>>,
    shutdown_timeout: Duration,
    ready_timeout: Duration,
}

impl ServiceRuntime {
    /// 创建带服务地址的运行时，启动后会探测该地址直到可以建立连接
    pub fn new(service_name: impl Into<String>, service_address: SocketAddr) -> Self {
        Self {
            service_name: service_name.into(),
            service_address: Some(service_address),
            tasks: Vec::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    /// 创建不对外监听的运行时
    pub fn without_address(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_address: None,
            tasks: Vec::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    /// 超时后中止仍未结束的任务
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn add_task(mut self, task: Box<dyn Task>) -> Self {
        info!(task_name = %task.name(), "Adding task to runtime");
        self.tasks.push(task);
        self
    }

    pub fn add_spawn<Fut>(self, name: impl Into<String>, future: Fut) -> Self
    where
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.add_task(Box::new(SpawnTask::new(name, future)))
    }

    pub fn add_spawn_with_shutdown<F, Fut>(self, name: impl Into<String>, future_fn: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        self.add_task(Box::new(SpawnTask::with_shutdown(name, future_fn)))
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 运行到 Ctrl+C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(error = %err, "Failed to listen for Ctrl+C");
            }
        })
        .await
    }

    /// 运行到 `signal` 完成
    ///
    /// 任务提前退出也会触发停机；如果该任务返回错误，则整体返回错误。
    pub async fn run_until<S>(mut self, signal: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        match self.service_address {
            Some(address) => info!(
                service_name = %self.service_name,
                address = %address,
                task_count = self.tasks.len(),
                "Starting service runtime"
            ),
            None => info!(
                service_name = %self.service_name,
                task_count = self.tasks.len(),
                "Starting service runtime"
            ),
        }

        let tasks = std::mem::take(&mut self.tasks);
        let (mut join_set, task_shutdowns) = Self::start_tasks(tasks);

        if let Err(err) = self.wait_for_tasks_ready().await {
            error!(error = %err, "Service did not become ready, shutting down");
            Self::send_shutdown(task_shutdowns);
            Self::wait_for_tasks_shutdown(self.shutdown_timeout, &mut join_set).await;
            return Err(err);
        }

        let early_exit = tokio::select! {
            _ = signal => {
                info!("Shutdown signal received");
                None
            }
            Some(result) = join_set.join_next() => {
                warn!("Task exited before shutdown was requested");
                Some(result)
            }
        };

        Self::send_shutdown(task_shutdowns);
        Self::wait_for_tasks_shutdown(self.shutdown_timeout, &mut join_set).await;
        info!(service_name = %self.service_name, "Service runtime stopped");

        match early_exit {
            Some(Ok(Err(err))) => Err(anyhow!("task failed: {err}")),
            Some(Err(err)) => Err(anyhow!("task panicked or was cancelled: {err}")),
            _ => Ok(()),
        }
    }

    async fn wait_for_tasks_ready(&self) -> Result<()> {
        let Some(address) = self.service_address else {
            return Ok(());
        };

        match tokio::time::timeout(
            self.ready_timeout,
            crate::utils::wait_for_server_ready(address),
        )
        .await
        {
            Ok(Ok(())) => {
                info!(address = %address, "Service is ready");
                Ok(())
            }
            Ok(Err(err)) => Err(anyhow!("service at {address} never became ready: {err}")),
            Err(_) => Err(anyhow!(
                "service ready check timed out after {:?}",
                self.ready_timeout
            )),
        }
    }

    fn start_tasks(tasks: Vec<Box<dyn Task>>) -> (JoinSet<TaskResult>, Vec<oneshot::Sender<()>>) {
        let mut join_set = JoinSet::new();
        let mut task_shutdowns = Vec::with_capacity(tasks.len());

        for task in tasks {
            let task_name = task.name().to_string();
            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            task_shutdowns.push(shutdown_tx);

            let task_future = task.run(shutdown_rx);
            join_set.spawn(async move {
                let result = task_future.await;
                match &result {
                    Ok(()) => info!(task_name = %task_name, "Task completed"),
                    Err(err) => error!(task_name = %task_name, error = %err, "Task failed"),
                }
                result
            });
        }

        (join_set, task_shutdowns)
    }

    fn send_shutdown(task_shutdowns: Vec<oneshot::Sender<()>>) {
        for tx in task_shutdowns {
            // 已退出的任务会丢弃接收端
            let _ = tx.send(());
        }
    }

    async fn wait_for_tasks_shutdown(timeout: Duration, join_set: &mut JoinSet<TaskResult>) {
        let drain = async {
            while let Some(result) = join_set.join_next().await {
                log_join_result(result);
            }
        };

        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                timeout = ?timeout,
                "Tasks shutdown timeout, aborting remaining tasks"
            );
            join_set.abort_all();
        } else {
            info!("All tasks completed");
        }
    }
}

fn log_join_result(result: std::result::Result<TaskResult, JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "Task completed with error"),
        Err(err) => warn!(error = %err, "Task join error"),
    }
}
