//! 服务运行时
//!
//! 统一管理进程内后台任务（gRPC 认证端点等）的启动、就绪检查和优雅停机。
//!
//! ```rust,no_run
//! use auth_service::runtime::{ServiceRuntime, TaskResult};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let runtime = ServiceRuntime::new("auth-service", "0.0.0.0:50051".parse()?)
//!     .add_spawn_with_shutdown("authenticator-grpc", |shutdown_rx| async move {
//!         let _ = shutdown_rx.await;
//!         TaskResult::Ok(())
//!     });
//!
//! runtime.run().await
//! # }
//! ```

#[allow(clippy::module_inception)]
pub mod runtime;
pub mod task;

pub use runtime::ServiceRuntime;
pub use task::{SpawnTask, Task, TaskResult};
