use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// 差异类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    PriceMismatch,
    ServiceNotInInvoice,
    ServiceNotInContract,
    /// 仅在开启供应商校验时由编排层产生, 比对引擎从不产生
    SupplierMismatch,
}

/// 差异取值: 金额, 文本, 或 "N/A" 占位
#[derive(Debug, Clone, PartialEq)]
pub enum IssueValue {
    Amount(BigDecimal),
    Text(String),
    NotApplicable,
}

impl IssueValue {
    pub const NOT_APPLICABLE: &'static str = "N/A";
}

impl Serialize for IssueValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IssueValue::Amount(v) => bigdecimal::serde::json_num::serialize(v, serializer),
            IssueValue::Text(s) => serializer.serialize_str(s),
            IssueValue::NotApplicable => serializer.serialize_str(Self::NOT_APPLICABLE),
        }
    }
}

/// 单条差异
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub contract_value: IssueValue,
    pub invoice_value: IssueValue,
}

/// 价格对比明细 (每个服务一行)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparisonDetail {
    pub service_name: String,
    #[serde(with = "bigdecimal::serde::json_num_option")]
    pub contract_price: Option<BigDecimal>, // 合同中不存在时为 null
    #[serde(with = "bigdecimal::serde::json_num")]
    pub invoice_price: BigDecimal, // 发票中不存在时为 0
    #[serde(rename = "match")]
    pub is_match: bool,
    /// invoice_price - contract_price, 仅两侧都存在时给出
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "bigdecimal::serde::json_num_option"
    )]
    pub difference: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 汇总标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Matches {
    pub prices_match: bool,
    /// 历史命名: 含义是"合同的每一项都出现在发票中", 而非反方向
    pub all_services_in_contract: bool,
    /// 发票的每一项都出现在合同中
    pub all_invoice_items_in_contract: bool,
}

/// 比对结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub matches: Matches,
    pub issues: Vec<Issue>,
    pub overall_match: bool,
    pub price_comparison_details: Vec<PriceComparisonDetail>,
}

impl ComparisonResult {
    pub fn issue_count(&self, issue_type: IssueType) -> usize {
        self.issues.iter().filter(|i| i.issue_type == issue_type).count()
    }
}

/// 单据级比对结果: 带上合同/发票标识
#[derive(Debug, Clone, Serialize)]
pub struct DocumentComparison {
    pub contract_id: String,
    pub invoice_id: String,
    pub contract_supplier: String,
    pub invoice_supplier: String,
    pub compared_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: ComparisonResult,
}
