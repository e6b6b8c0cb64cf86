//! 任务定义

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;

/// 任务执行结果
pub type TaskResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type TaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send>>;

/// 运行时管理的任务
pub trait Task: Send {
    fn name(&self) -> &str;

    /// 运行任务，`shutdown_rx` 收到信号后任务应尽快返回
    fn run(self: Box<Self>, shutdown_rx: oneshot::Receiver<()>) -> TaskFuture;
}

/// 包装 Future 的任务
///
/// 需要关闭信号的任务（例如 gRPC 服务）通过闭包延迟构建 Future。
pub struct SpawnTask {
    name: String,
    future_fn: Box<dyn FnOnce(oneshot::Receiver<()>) -> TaskFuture + Send + 'static>,
}

impl SpawnTask {
    /// 不关心关闭信号的任务
    pub fn new<Fut>(name: impl Into<String>, future: Fut) -> Self
    where
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            future_fn: Box::new(move |_shutdown_rx| Box::pin(future)),
        }
    }

    pub fn with_shutdown<F, Fut>(name: impl Into<String>, future_fn: F) -> Self
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut + Send + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            future_fn: Box::new(move |shutdown_rx| Box::pin(future_fn(shutdown_rx))),
        }
    }
}

impl Task for SpawnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(self: Box<Self>, shutdown_rx: oneshot::Receiver<()>) -> TaskFuture {
        (self.future_fn)(shutdown_rx)
    }
}
