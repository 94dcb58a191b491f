use crate::models::InvoiceData;
use dashmap::DashMap;

/// 已拉取发票缓存 (按发票ID), 作为显式参数传给编排层
#[derive(Debug, Default)]
pub struct InvoiceCache {
    invoices: DashMap<String, InvoiceData>,
}

impl InvoiceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用最新的发票列表整体替换缓存
    pub fn replace_all(&self, invoices: Vec<InvoiceData>) {
        self.invoices.clear();
        for invoice in invoices {
            self.invoices.insert(invoice.id.clone(), invoice);
        }
    }

    pub fn insert(&self, invoice: InvoiceData) {
        self.invoices.insert(invoice.id.clone(), invoice);
    }

    pub fn get(&self, invoice_id: &str) -> Option<InvoiceData> {
        self.invoices.get(invoice_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}
