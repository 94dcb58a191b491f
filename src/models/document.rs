use crate::models::decimal;
use crate::models::item::{ContractItem, InvoiceItem};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 合同 (供应商约定的明细)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub supplier_name: String,
    #[serde(default)]
    pub items: Vec<ContractItem>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// 发票 (后端 OCR/AI 提取结果)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    pub id: String,
    #[serde(default)]
    pub invoice_number: String,
    pub supplier_name: String,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub subtotal: Option<BigDecimal>,
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub tax: Option<BigDecimal>,
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub total: Option<BigDecimal>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Contract {
    pub fn new(id: impl Into<String>, supplier_name: impl Into<String>, items: Vec<ContractItem>) -> Self {
        Self {
            id: id.into(),
            supplier_name: supplier_name.into(),
            items,
            created_at: None,
            updated_at: None,
        }
    }
}

impl InvoiceData {
    pub fn new(id: impl Into<String>, supplier_name: impl Into<String>, items: Vec<InvoiceItem>) -> Self {
        Self {
            id: id.into(),
            invoice_number: String::new(),
            supplier_name: supplier_name.into(),
            issue_date: None,
            due_date: None,
            items,
            subtotal: None,
            tax: None,
            total: None,
            created_at: None,
        }
    }
}
