use crate::client::DocumentSource;
use crate::error::ReconcileError;
use crate::models::{ComparisonResult, ContractItem, DocumentComparison, InvoiceItem};
use crate::service::{reconciler, report, ComparisonService};
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 直接提交两侧明细
#[derive(Debug, Deserialize)]
pub struct CompareItemsRequest {
    #[serde(default)]
    pub contract_items: Vec<ContractItem>,
    #[serde(default)]
    pub invoice_items: Vec<InvoiceItem>,
}

/// 请求体: 合同ID + 发票ID
#[derive(Debug, Deserialize)]
pub struct CompareDocumentsRequest {
    #[serde(default)]
    pub contract_id: String,
    #[serde(default)]
    pub invoice_id: String,
}

/// 请求体: 合同ID + 发票ID列表
#[derive(Debug, Deserialize)]
pub struct BatchCompareRequest {
    #[serde(default)]
    pub contract_id: String,
    #[serde(default)]
    pub invoice_ids: Vec<String>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub success: bool,
    pub message: String,
    pub comparison: Option<DocumentComparison>,
    pub issue_messages: Vec<String>,
}

/// 批量响应体
#[derive(Debug, Serialize)]
pub struct BatchCompareResponse {
    pub success: bool,
    pub message: String,
    pub comparisons: Option<Vec<DocumentComparison>>,
}

/// 简单响应体
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

fn failure(e: &ReconcileError) -> Response {
    tracing::error!("Request failed: {}", e);
    let response = StatusResponse {
        success: false,
        message: format!("Error: {}", e),
    };
    (e.status_code(), Json(response)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 明细直接比对 (纯计算, 不访问后端)
pub async fn compare_items(Json(req): Json<CompareItemsRequest>) -> Json<ComparisonResult> {
    Json(reconciler::compare(&req.contract_items, &req.invoice_items))
}

/// 明细比对并导出 CSV 价格表
pub async fn export_items(Json(req): Json<CompareItemsRequest>) -> Response {
    let result = reconciler::compare(&req.contract_items, &req.invoice_items);
    match report::export_csv(&result) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => failure(&e),
    }
}

/// 合同 vs 发票比对
pub async fn compare_documents<S: DocumentSource + 'static>(
    State(service): State<Arc<ComparisonService<S>>>,
    Json(req): Json<CompareDocumentsRequest>,
) -> Response {
    match service.compare_documents(&req.contract_id, &req.invoice_id).await {
        Ok(comparison) => {
            let message = if comparison.result.overall_match {
                "Contract and invoice match".to_string()
            } else {
                format!("Found {} issues", comparison.result.issues.len())
            };
            let response = CompareResponse {
                success: true,
                message,
                issue_messages: comparison.result.issues.iter().map(report::issue_message).collect(),
                comparison: Some(comparison),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => failure(&e),
    }
}

/// 一份合同批量比对多张发票
pub async fn batch_compare<S: DocumentSource + 'static>(
    State(service): State<Arc<ComparisonService<S>>>,
    Json(req): Json<BatchCompareRequest>,
) -> Response {
    match service.batch_compare(&req.contract_id, &req.invoice_ids).await {
        Ok(comparisons) => {
            let matched = comparisons.iter().filter(|c| c.result.overall_match).count();
            let response = BatchCompareResponse {
                success: true,
                message: format!(
                    "Compared {} invoices, {} match contract {}",
                    comparisons.len(),
                    matched,
                    req.contract_id.trim()
                ),
                comparisons: Some(comparisons),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => failure(&e),
    }
}

/// 刷新发票缓存
pub async fn refresh_invoices<S: DocumentSource + 'static>(
    State(service): State<Arc<ComparisonService<S>>>,
) -> Response {
    match service.refresh_invoices().await {
        Ok(count) => {
            let response = StatusResponse {
                success: true,
                message: format!("Loaded {} invoices", count),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => failure(&e),
    }
}
