use axum::http::StatusCode;

/// 服务错误 (比对引擎本身不会失败, 只有外部取数和导出会出错)
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Missing {0} identifier")]
    MissingIdentifier(&'static str),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("Backend rejected credentials")]
    Unauthorized,
    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Report export failed: {0}")]
    Export(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;

impl ReconcileError {
    /// HTTP 状态码映射
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReconcileError::MissingIdentifier(_) => StatusCode::BAD_REQUEST,
            ReconcileError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReconcileError::Unauthorized
            | ReconcileError::Backend { .. }
            | ReconcileError::Http(_) => StatusCode::BAD_GATEWAY,
            ReconcileError::InvalidBaseUrl(_) | ReconcileError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
