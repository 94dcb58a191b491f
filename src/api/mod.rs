pub mod handlers;

pub use handlers::*;

use crate::client::DocumentSource;
use crate::service::ComparisonService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router<S: DocumentSource + 'static>(service: Arc<ComparisonService<S>>) -> Router {
    // 纯计算路由, 无状态
    let engine_routes = Router::new()
        .route("/api/compare", post(compare_items))
        .route("/api/compare/export", post(export_items));

    // 需要访问文档后端的路由
    let document_routes = Router::new()
        .route("/api/compare/documents", post(compare_documents::<S>))
        .route("/api/compare/batch", post(batch_compare::<S>))
        .route("/api/invoices/refresh", post(refresh_invoices::<S>))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(engine_routes)
        .merge(document_routes)
}
