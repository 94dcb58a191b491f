use crate::client::DocumentSource;
use crate::error::{ReconcileError, Result};
use crate::models::{Contract, InvoiceData};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 内存数据源 (测试/演示用)
#[derive(Debug, Default)]
pub struct MemorySource {
    contracts: DashMap<String, Contract>,
    invoices: DashMap<String, InvoiceData>,
    invoice_fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_contract(&self, contract: Contract) {
        self.contracts.insert(contract.id.clone(), contract);
    }

    pub fn add_invoice(&self, invoice: InvoiceData) {
        self.invoices.insert(invoice.id.clone(), invoice);
    }

    /// fetch_invoice 被调用的次数
    pub fn invoice_fetches(&self) -> usize {
        self.invoice_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch_contract(&self, contract_id: &str) -> Result<Contract> {
        self.contracts
            .get(contract_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ReconcileError::NotFound {
                kind: "Contract",
                id: contract_id.to_string(),
            })
    }

    async fn fetch_invoice(&self, invoice_id: &str) -> Result<InvoiceData> {
        self.invoice_fetches.fetch_add(1, Ordering::SeqCst);
        self.invoices
            .get(invoice_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ReconcileError::NotFound {
                kind: "Invoice",
                id: invoice_id.to_string(),
            })
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceData>> {
        Ok(self.invoices.iter().map(|entry| entry.value().clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_are_visible_and_replace_by_id() {
        let source = MemorySource::new();
        source.add_contract(Contract::new("c-1", "Acme", vec![]));
        source.add_contract(Contract::new("c-1", "Acme Ltd", vec![]));
        source.add_invoice(InvoiceData::new("inv-1", "Acme", vec![]));

        let contract = source.fetch_contract("c-1").await.unwrap();
        assert_eq!(contract.supplier_name, "Acme Ltd");
        assert_eq!(source.list_invoices().await.unwrap().len(), 1);

        let err = source.fetch_invoice("inv-404").await.unwrap_err();
        assert!(matches!(err, ReconcileError::NotFound { kind: "Invoice", .. }));
        assert_eq!(source.invoice_fetches(), 1);
    }
}
