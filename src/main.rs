use contract_reconcile_rust::{api, AppConfig, BackendClient, ComparisonService, InvoiceCache};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 文档后端客户端 + 发票缓存
    let backend = BackendClient::new(&config.backend)?;
    let invoices = Arc::new(InvoiceCache::new());
    let service = Arc::new(ComparisonService::new(
        backend,
        invoices,
        config.comparison.clone(),
    ));

    // 启动时预热发票缓存, 失败不影响启动
    match service.refresh_invoices().await {
        Ok(count) => info!("Invoice cache warmed with {} invoices", count),
        Err(e) => tracing::warn!("Invoice cache warm-up skipped: {}", e),
    }

    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/compare            - compare submitted line items");
    info!("  POST /api/compare/export     - price table as CSV");
    info!("  POST /api/compare/documents  - contract vs invoice by id");
    info!("  POST /api/compare/batch      - contract vs many invoices");
    info!("  POST /api/invoices/refresh   - reload invoice cache");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
