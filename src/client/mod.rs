pub mod backend;
pub mod cache;
pub mod memory;

pub use backend::BackendClient;
pub use cache::InvoiceCache;
pub use memory::MemorySource;

use crate::error::Result;
use crate::models::{Contract, InvoiceData};
use async_trait::async_trait;

/// 合同/发票数据来源 (外部后端)
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_contract(&self, contract_id: &str) -> Result<Contract>;

    async fn fetch_invoice(&self, invoice_id: &str) -> Result<InvoiceData>;

    async fn list_invoices(&self) -> Result<Vec<InvoiceData>>;
}
