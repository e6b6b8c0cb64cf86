use super::extract_trace_info;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::debug;

/// 追踪拦截器
///
/// 把请求元数据中的 `x-trace-id` / `x-request-id` 放入请求扩展，供处理函数记录到 span 中。
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl TracingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for TracingInterceptor {
    fn call(&mut self, mut req: Request<()>) -> Result<Request<()>, Status> {
        if let Some(trace_info) = extract_trace_info(&req) {
            debug!(
                trace_id = %trace_info.trace_id,
                request_id = %trace_info.request_id,
                "Processing gRPC request"
            );
            req.extensions_mut().insert(trace_info);
        }
        Ok(req)
    }
}
