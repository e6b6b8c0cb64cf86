//! gRPC 拦截器模块
//!
//! 提供追踪信息提取拦截器

pub mod tracing;

pub use self::tracing::TracingInterceptor;

use tonic::Request;

/// 追踪信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceInfo {
    pub trace_id: String,
    pub request_id: String,
}

/// 提取追踪信息
pub fn extract_trace_info<T>(req: &Request<T>) -> Option<TraceInfo> {
    let trace_id = crate::utils::extract_trace_id(req).unwrap_or_default();
    let request_id = crate::utils::extract_request_id(req).unwrap_or_default();

    if trace_id.is_empty() && request_id.is_empty() {
        return None;
    }

    Some(TraceInfo {
        trace_id,
        request_id,
    })
}

/// 读取拦截器放入扩展中的追踪信息
pub fn trace_info<T>(req: &Request<T>) -> TraceInfo {
    req.extensions().get::<TraceInfo>().cloned().unwrap_or_default()
}
