use crate::models::decimal::to_cents;
use crate::models::{
    ComparisonResult, ContractItem, InvoiceData, InvoiceItem, Issue, IssueType, IssueValue,
    Matches, PriceComparisonDetail,
};
use bigdecimal::{BigDecimal, Zero};
use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;

pub const NOTE_NOT_IN_INVOICE: &str = "Service not found in invoice";
pub const NOTE_NOT_IN_CONTRACT: &str = "Service not found in contract";

/// 价格容差: 固定绝对值 0.01
pub fn price_tolerance() -> BigDecimal {
    BigDecimal::new(1i64.into(), 2)
}

/// 名称归一化: 转小写后去掉首尾空白
pub fn normalize_description(description: &str) -> String {
    description.to_lowercase().trim().to_string()
}

/// |a - b| < 0.01
pub fn prices_agree(contract_price: &BigDecimal, invoice_price: &BigDecimal) -> bool {
    (contract_price - invoice_price).abs() < price_tolerance()
}

/// 合同明细与发票明细比对 (纯函数, 无副作用)
///
/// 输出顺序: 先按合同顺序逐项输出, 再按发票顺序输出合同中不存在的发票项。
/// 同名 (归一化后) 的发票项只取第一个; 多个同名合同项会重复匹配同一发票项。
pub fn compare(contract_items: &[ContractItem], invoice_items: &[InvoiceItem]) -> ComparisonResult {
    // 发票索引: 归一化名称 -> 首个出现位置
    let mut invoice_index: IndexMap<String, usize> = IndexMap::with_capacity(invoice_items.len());
    for (idx, item) in invoice_items.iter().enumerate() {
        invoice_index
            .entry(normalize_description(&item.description))
            .or_insert(idx);
    }

    let contract_names: IndexSet<String> = contract_items
        .iter()
        .map(|c| normalize_description(&c.description))
        .collect();

    let mut issues = Vec::new();
    let mut details = Vec::with_capacity(contract_items.len() + invoice_items.len());
    let mut prices_match_overall = true;
    let mut all_contract_items_in_invoice = true;
    let mut all_invoice_items_in_contract = true;

    // 1. 合同侧
    for c_item in contract_items {
        let contract_price = c_item.contract_price();
        let matched = invoice_index
            .get(&normalize_description(&c_item.description))
            .map(|&idx| &invoice_items[idx]);

        let detail = match matched {
            Some(i_item) => {
                let invoice_price = i_item.billed_price();
                let item_match = prices_agree(&contract_price, &invoice_price);
                let mut note = None;
                if !item_match {
                    prices_match_overall = false;
                    note = Some(format!(
                        "Price mismatch: Contract {}, Invoice {}",
                        to_cents(&contract_price),
                        to_cents(&invoice_price)
                    ));
                    issues.push(Issue {
                        issue_type: IssueType::PriceMismatch,
                        service_name: Some(c_item.description.clone()),
                        contract_value: IssueValue::Amount(contract_price.clone()),
                        invoice_value: IssueValue::Amount(invoice_price.clone()),
                    });
                }
                PriceComparisonDetail {
                    service_name: c_item.description.clone(),
                    difference: Some(&invoice_price - &contract_price),
                    contract_price: Some(contract_price),
                    invoice_price,
                    is_match: item_match,
                    note,
                }
            }
            None => {
                all_contract_items_in_invoice = false;
                prices_match_overall = false;
                issues.push(Issue {
                    issue_type: IssueType::ServiceNotInInvoice,
                    service_name: Some(c_item.description.clone()),
                    contract_value: IssueValue::Amount(contract_price.clone()),
                    invoice_value: IssueValue::NotApplicable,
                });
                PriceComparisonDetail {
                    service_name: c_item.description.clone(),
                    contract_price: Some(contract_price),
                    invoice_price: BigDecimal::zero(),
                    is_match: false,
                    difference: None,
                    note: Some(NOTE_NOT_IN_INVOICE.to_string()),
                }
            }
        };
        details.push(detail);
    }

    // 2. 发票侧: 独立检查是否存在于合同, 不考虑合同项是否已被匹配
    for i_item in invoice_items {
        if contract_names.contains(&normalize_description(&i_item.description)) {
            continue;
        }

        all_invoice_items_in_contract = false;
        let invoice_price = i_item.billed_price();
        issues.push(Issue {
            issue_type: IssueType::ServiceNotInContract,
            service_name: Some(i_item.description.clone()),
            contract_value: IssueValue::NotApplicable,
            invoice_value: IssueValue::Amount(invoice_price.clone()),
        });
        details.push(PriceComparisonDetail {
            service_name: i_item.description.clone(),
            contract_price: None,
            invoice_price,
            is_match: false,
            difference: None,
            note: Some(NOTE_NOT_IN_CONTRACT.to_string()),
        });
    }

    let overall_match = prices_match_overall
        && all_contract_items_in_invoice
        && all_invoice_items_in_contract
        && issues.is_empty();

    ComparisonResult {
        matches: Matches {
            prices_match: prices_match_overall,
            all_services_in_contract: all_contract_items_in_invoice,
            all_invoice_items_in_contract,
        },
        issues,
        overall_match,
        price_comparison_details: details,
    }
}

/// 一份合同对多张发票并行比对, 结果与输入顺序一致
pub fn compare_many(contract_items: &[ContractItem], invoices: &[InvoiceData]) -> Vec<ComparisonResult> {
    invoices
        .par_iter()
        .map(|invoice| compare(contract_items, &invoice.items))
        .collect()
}
