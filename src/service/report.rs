use crate::error::{ReconcileError, Result};
use crate::models::decimal::to_cents;
use crate::models::{ComparisonResult, Issue, IssueType, IssueValue, PriceComparisonDetail};
use crate::service::reconciler::{prices_agree, NOTE_NOT_IN_INVOICE};
use bigdecimal::{BigDecimal, Zero};

const PLACEHOLDER_SERVICE: &str = "No detailed price data available";
const PLACEHOLDER_NOTE: &str = "No items found in contract/invoice";

/// 价格表行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Match,
    PriceMismatch,
    MissingInInvoice,
    ExtraInInvoice,
}

/// 价格表展示行
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub service_name: String,
    pub contract_price: Option<BigDecimal>,
    pub invoice_price: BigDecimal,
    pub difference: BigDecimal,
    pub percent: Option<BigDecimal>, // 仅价格不一致时给出
    pub status: RowStatus,
    pub note: Option<String>,
}

impl PriceRow {
    fn from_detail(detail: &PriceComparisonDetail) -> Self {
        let contract_price = detail.contract_price.clone().unwrap_or_else(BigDecimal::zero);
        let difference = &detail.invoice_price - &contract_price;

        let status = if detail.contract_price.is_none() {
            RowStatus::ExtraInInvoice
        } else if detail.note.as_deref() == Some(NOTE_NOT_IN_INVOICE) {
            RowStatus::MissingInInvoice
        } else if prices_agree(&contract_price, &detail.invoice_price) {
            RowStatus::Match
        } else {
            RowStatus::PriceMismatch
        };

        let percent = (status == RowStatus::PriceMismatch).then(|| percent_delta(&difference, &contract_price));

        Self {
            service_name: detail.service_name.clone(),
            contract_price: detail.contract_price.clone(),
            invoice_price: detail.invoice_price.clone(),
            difference,
            percent,
            status,
            note: detail.note.clone(),
        }
    }

    fn placeholder() -> Self {
        Self {
            service_name: PLACEHOLDER_SERVICE.to_string(),
            contract_price: None,
            invoice_price: BigDecimal::zero(),
            difference: BigDecimal::zero(),
            percent: None,
            status: RowStatus::ExtraInInvoice,
            note: Some(PLACEHOLDER_NOTE.to_string()),
        }
    }
}

/// 偏差百分比: round(|diff| / contract * 100), 合同价不为正时记 100
fn percent_delta(difference: &BigDecimal, contract_price: &BigDecimal) -> BigDecimal {
    let abs_diff = difference.abs();
    if abs_diff.is_zero() || *contract_price <= BigDecimal::zero() {
        return BigDecimal::from(100);
    }
    let ratio = abs_diff * BigDecimal::from(100) / contract_price.clone();
    // 正数: +0.5 后截断即四舍五入
    (ratio + BigDecimal::new(5i64.into(), 1)).with_scale(0)
}

/// 生成价格表行; 无明细时返回一行占位
pub fn price_rows(result: &ComparisonResult) -> Vec<PriceRow> {
    if result.price_comparison_details.is_empty() {
        return vec![PriceRow::placeholder()];
    }
    result
        .price_comparison_details
        .iter()
        .map(PriceRow::from_detail)
        .collect()
}

/// 美元格式: $1,234.50 / -$5.00
pub fn format_usd(value: &BigDecimal) -> String {
    let cents = to_cents(value).to_string();
    let (sign, digits) = match cents.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cents.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, frac_part)
}

fn display_value(value: &IssueValue) -> String {
    match value {
        IssueValue::Amount(v) => format_usd(v),
        IssueValue::Text(s) => s.clone(),
        IssueValue::NotApplicable => IssueValue::NOT_APPLICABLE.to_string(),
    }
}

/// 差异提示文案
pub fn issue_message(issue: &Issue) -> String {
    let service = issue.service_name.as_deref().unwrap_or_default();
    match issue.issue_type {
        IssueType::PriceMismatch => format!(
            "Price mismatch for \"{}\": Contract: {}, Invoice: {}",
            service,
            display_value(&issue.contract_value),
            display_value(&issue.invoice_value)
        ),
        IssueType::ServiceNotInInvoice => format!(
            "Service \"{}\" from contract not found in invoice. Contract Price: {}",
            service,
            display_value(&issue.contract_value)
        ),
        IssueType::ServiceNotInContract => format!(
            "Service \"{}\" from invoice not found in contract. Invoice Price: {}",
            service,
            display_value(&issue.invoice_value)
        ),
        IssueType::SupplierMismatch => format!(
            "Supplier name mismatch: Contract: \"{}\", Invoice: \"{}\"",
            display_value(&issue.contract_value),
            display_value(&issue.invoice_value)
        ),
    }
}

/// 导出价格表 CSV
pub fn export_csv(result: &ComparisonResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "service_name",
        "contract_price",
        "invoice_price",
        "difference",
        "percent",
        "status",
        "note",
    ])?;

    for row in price_rows(result) {
        let status = match row.status {
            RowStatus::Match => "match",
            RowStatus::PriceMismatch => "price_mismatch",
            RowStatus::MissingInInvoice => "missing_in_invoice",
            RowStatus::ExtraInInvoice => "extra_in_invoice",
        };
        writer.write_record([
            row.service_name,
            row.contract_price.as_ref().map(to_cents).map(|v| v.to_string()).unwrap_or_default(),
            to_cents(&row.invoice_price).to_string(),
            to_cents(&row.difference).to_string(),
            row.percent.map(|p| p.to_string()).unwrap_or_default(),
            status.to_string(),
            row.note.unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ReconcileError::Export(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use crate::service::reconciler::compare;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(&dec("1234.5")), "$1,234.50");
        assert_eq!(format_usd(&dec("100")), "$100.00");
        assert_eq!(format_usd(&dec("-5")), "-$5.00");
        assert_eq!(format_usd(&dec("1234567.891")), "$1,234,567.89");
    }

    #[test]
    fn test_price_rows_statuses_and_percent() {
        let contract = vec![
            LineItem::new("Hosting", dec("100")),
            LineItem::new("Support", dec("50")),
            LineItem::new("Licence", dec("80")),
        ];
        let invoice = vec![
            LineItem::new("hosting", dec("117")),
            LineItem::new("Support", dec("50")),
            LineItem::new("Travel", dec("20")),
        ];
        let rows = price_rows(&compare(&contract, &invoice));

        let statuses: Vec<RowStatus> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                RowStatus::PriceMismatch,
                RowStatus::Match,
                RowStatus::MissingInInvoice,
                RowStatus::ExtraInInvoice
            ]
        );
        assert_eq!(rows[0].percent.as_ref().map(|p| p.to_string()), Some("17".to_string()));
        assert_eq!(rows[0].difference, dec("17"));
        assert_eq!(rows[3].difference, dec("20"));
    }

    #[test]
    fn test_percent_is_100_for_zero_contract_price() {
        assert_eq!(percent_delta(&dec("12"), &BigDecimal::zero()), BigDecimal::from(100));
    }

    #[test]
    fn test_empty_result_gets_placeholder_row() {
        let rows = price_rows(&compare(&[], &[]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].service_name, PLACEHOLDER_SERVICE);
        assert_eq!(rows[0].note.as_deref(), Some(PLACEHOLDER_NOTE));
    }

    #[test]
    fn test_issue_messages() {
        let result = compare(
            &[LineItem::new("Hosting", dec("100")), LineItem::new("Backup", dec("10"))],
            &[LineItem::new("Hosting", dec("120")), LineItem::new("Extra Fee", dec("5"))],
        );
        let messages: Vec<String> = result.issues.iter().map(issue_message).collect();
        assert_eq!(
            messages,
            vec![
                "Price mismatch for \"Hosting\": Contract: $100.00, Invoice: $120.00".to_string(),
                "Service \"Backup\" from contract not found in invoice. Contract Price: $10.00".to_string(),
                "Service \"Extra Fee\" from invoice not found in contract. Invoice Price: $5.00".to_string(),
            ]
        );

        let supplier = Issue {
            issue_type: IssueType::SupplierMismatch,
            service_name: None,
            contract_value: IssueValue::Text("Acme".to_string()),
            invoice_value: IssueValue::Text("Globex".to_string()),
        };
        let credit = Issue {
            issue_type: IssueType::ServiceNotInContract,
            service_name: Some("Volume Rebate".to_string()),
            contract_value: IssueValue::NotApplicable,
            invoice_value: IssueValue::Amount(dec("-1250")),
        };
        assert_eq!(
            issue_message(&credit),
            "Service \"Volume Rebate\" from invoice not found in contract. Invoice Price: -$1,250.00"
        );

        assert_eq!(
            issue_message(&supplier),
            "Supplier name mismatch: Contract: \"Acme\", Invoice: \"Globex\""
        );
    }

    #[test]
    fn test_export_csv() {
        let result = compare(&[LineItem::new("Hosting", dec("100"))], &[]);
        let csv = String::from_utf8(export_csv(&result).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "service_name,contract_price,invoice_price,difference,percent,status,note");
        assert_eq!(lines[1], "Hosting,100.00,0.00,-100.00,,missing_in_invoice,Service not found in invoice");
    }
}
