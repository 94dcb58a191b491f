use crate::client::{DocumentSource, InvoiceCache};
use crate::config::ComparisonSettings;
use crate::error::{ReconcileError, Result};
use crate::models::{
    ComparisonResult, Contract, DocumentComparison, InvoiceData, Issue, IssueType, IssueValue,
};
use crate::service::reconciler;
use chrono::Utc;
use futures::future::try_join_all;
use std::sync::Arc;

/// 比对编排服务: 先取合同, 再取发票, 最后调用比对引擎
///
/// 发票缓存由调用方显式传入, 服务本身不持有隐式全局状态。
pub struct ComparisonService<S> {
    source: S,
    invoices: Arc<InvoiceCache>,
    settings: ComparisonSettings,
}

impl<S: DocumentSource> ComparisonService<S> {
    pub fn new(source: S, invoices: Arc<InvoiceCache>, settings: ComparisonSettings) -> Self {
        Self {
            source,
            invoices,
            settings,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn invoice_cache(&self) -> &InvoiceCache {
        &self.invoices
    }

    /// 重新拉取发票列表并替换缓存
    pub async fn refresh_invoices(&self) -> Result<usize> {
        let invoices = self.source.list_invoices().await?;
        let count = invoices.len();
        self.invoices.replace_all(invoices);
        tracing::info!("Invoice cache refreshed: {} invoices", count);
        Ok(count)
    }

    /// 单据比对入口
    pub async fn compare_documents(&self, contract_id: &str, invoice_id: &str) -> Result<DocumentComparison> {
        let contract_id = require_id(contract_id, "contract")?;
        let invoice_id = require_id(invoice_id, "invoice")?;

        // 取数失败直接返回, 不对不完整数据调用引擎
        let contract = self.source.fetch_contract(contract_id).await?;
        let invoice = self.resolve_invoice(invoice_id).await?;

        let comparison = self.compare_loaded(&contract, &invoice, reconciler::compare(&contract.items, &invoice.items));
        log_outcome(&comparison);
        Ok(comparison)
    }

    /// 一份合同批量比对多张发票
    pub async fn batch_compare(&self, contract_id: &str, invoice_ids: &[String]) -> Result<Vec<DocumentComparison>> {
        let contract_id = require_id(contract_id, "contract")?;
        let invoice_ids = invoice_ids
            .iter()
            .map(|id| require_id(id, "invoice"))
            .collect::<Result<Vec<_>>>()?;

        let contract = self.source.fetch_contract(contract_id).await?;
        let invoices = try_join_all(invoice_ids.iter().map(|id| self.resolve_invoice(id))).await?;

        tracing::info!(
            "Batch comparing contract {} against {} invoices",
            contract.id,
            invoices.len()
        );

        let results = reconciler::compare_many(&contract.items, &invoices);
        let comparisons: Vec<DocumentComparison> = invoices
            .iter()
            .zip(results)
            .map(|(invoice, result)| self.compare_loaded(&contract, invoice, result))
            .collect();

        let matched = comparisons.iter().filter(|c| c.result.overall_match).count();
        tracing::info!(
            "Batch for contract {} finished: {}/{} invoices match",
            contract.id,
            matched,
            comparisons.len()
        );
        Ok(comparisons)
    }

    /// 缓存优先, 未命中时从后端拉取并写入缓存
    async fn resolve_invoice(&self, invoice_id: &str) -> Result<InvoiceData> {
        if let Some(invoice) = self.invoices.get(invoice_id) {
            return Ok(invoice);
        }

        tracing::debug!("Invoice {} not cached, fetching", invoice_id);
        let invoice = self.source.fetch_invoice(invoice_id).await?;
        self.invoices.insert(invoice.clone());
        Ok(invoice)
    }

    fn compare_loaded(&self, contract: &Contract, invoice: &InvoiceData, mut result: ComparisonResult) -> DocumentComparison {
        if self.settings.check_supplier {
            apply_supplier_check(&mut result, &contract.supplier_name, &invoice.supplier_name);
        }

        DocumentComparison {
            contract_id: contract.id.clone(),
            invoice_id: invoice.id.clone(),
            contract_supplier: contract.supplier_name.clone(),
            invoice_supplier: invoice.supplier_name.clone(),
            compared_at: Utc::now(),
            result,
        }
    }
}

fn require_id<'a>(id: &'a str, kind: &'static str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ReconcileError::MissingIdentifier(kind));
    }
    Ok(trimmed)
}

/// 供应商名称不一致时在差异列表最前面插入 supplier_mismatch
pub fn apply_supplier_check(result: &mut ComparisonResult, contract_supplier: &str, invoice_supplier: &str) {
    if reconciler::normalize_description(contract_supplier) == reconciler::normalize_description(invoice_supplier) {
        return;
    }

    result.issues.insert(
        0,
        Issue {
            issue_type: IssueType::SupplierMismatch,
            service_name: None,
            contract_value: IssueValue::Text(contract_supplier.to_string()),
            invoice_value: IssueValue::Text(invoice_supplier.to_string()),
        },
    );
    result.overall_match = false;
}

fn log_outcome(comparison: &DocumentComparison) {
    let result = &comparison.result;
    if result.overall_match {
        tracing::info!(
            "Contract {} vs invoice {}: match ({} services)",
            comparison.contract_id,
            comparison.invoice_id,
            result.price_comparison_details.len()
        );
    } else {
        tracing::warn!(
            "Contract {} vs invoice {}: {} issues (price mismatch: {}, missing in invoice: {}, missing in contract: {})",
            comparison.contract_id,
            comparison.invoice_id,
            result.issues.len(),
            result.issue_count(IssueType::PriceMismatch),
            result.issue_count(IssueType::ServiceNotInInvoice),
            result.issue_count(IssueType::ServiceNotInContract)
        );
    }
}
