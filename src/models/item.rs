use crate::models::decimal;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 明细行 (合同与发票共用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String, // 服务/商品名称, 归一化后作为匹配键
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub quantity: Option<BigDecimal>,
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub unit_price: Option<BigDecimal>, // 单价, 可为负 (折扣行)
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize"
    )]
    pub total: Option<BigDecimal>, // 行合计, 由数据源给出, 不重新计算
    #[serde(
        default,
        deserialize_with = "decimal::lenient",
        serialize_with = "bigdecimal::serde::json_num_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_price: Option<BigDecimal>,
}

/// 合同明细
pub type ContractItem = LineItem;
/// 发票明细 (OCR 提取)
pub type InvoiceItem = LineItem;

impl LineItem {
    pub fn new(description: impl Into<String>, unit_price: BigDecimal) -> Self {
        Self {
            description: description.into(),
            quantity: None,
            unit_price: Some(unit_price),
            total: None,
            total_price: None,
        }
    }

    pub fn with_quantity(mut self, quantity: BigDecimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_total(mut self, total: BigDecimal) -> Self {
        self.total = Some(total);
        self
    }

    /// 合同侧价格: 单价, 缺失时为 0
    pub fn contract_price(&self) -> BigDecimal {
        self.unit_price.clone().unwrap_or_else(BigDecimal::zero)
    }

    /// 发票侧价格: 非零单价优先, 否则非零行合计, 否则 0
    pub fn billed_price(&self) -> BigDecimal {
        non_zero(&self.unit_price)
            .or_else(|| non_zero(&self.total))
            .unwrap_or_else(BigDecimal::zero)
    }
}

fn non_zero(value: &Option<BigDecimal>) -> Option<BigDecimal> {
    value.as_ref().filter(|v| !v.is_zero()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billed_price_fallback_order() {
        let item = LineItem::new("Hosting", BigDecimal::from(100))
            .with_quantity(BigDecimal::from(3))
            .with_total(BigDecimal::from(300));
        assert_eq!(item.billed_price(), BigDecimal::from(100));

        let zero_unit = LineItem::new("Hosting", BigDecimal::zero()).with_total(BigDecimal::from(300));
        assert_eq!(zero_unit.billed_price(), BigDecimal::from(300));

        let mut empty = LineItem::new("Hosting", BigDecimal::zero());
        empty.unit_price = None;
        assert_eq!(empty.billed_price(), BigDecimal::zero());
    }

    #[test]
    fn test_contract_price_defaults_to_zero() {
        let mut item = LineItem::new("Support", BigDecimal::from(-20));
        assert_eq!(item.contract_price(), BigDecimal::from(-20));
        item.unit_price = None;
        assert_eq!(item.contract_price(), BigDecimal::zero());
    }

    #[test]
    fn test_deserialize_backend_item() {
        let item: LineItem = serde_json::from_str(
            r#"{"description": "Consulting Fee", "quantity": 2, "unit_price": "150.00", "total": 300}"#,
        )
        .unwrap();
        assert_eq!(item.quantity, Some(BigDecimal::from(2)));
        assert_eq!(item.unit_price, Some(BigDecimal::from(150)));
        assert_eq!(item.total_price, None);
    }
}
