use bigdecimal::BigDecimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// 宽松解析金额: 数字/数字字符串 -> Some, null/缺失/空串 -> None
///
/// 数字按其 JSON 文本转成十进制, 避免二进制浮点误差 (10.01 仍是 10.01)。
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.to_string()
        }
        Some(other) => return Err(D::Error::custom(format!("invalid amount: {}", other))),
    };

    BigDecimal::from_str(&text)
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid amount {:?}: {}", text, e)))
}

/// 保留两位小数 (用于说明文字)
pub fn to_cents(value: &BigDecimal) -> BigDecimal {
    value.round(2).with_scale(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient")]
        amount: Option<BigDecimal>,
    }

    fn parse(json: &str) -> Option<BigDecimal> {
        serde_json::from_str::<Holder>(json).unwrap().amount
    }

    #[test]
    fn test_number_keeps_decimal_digits() {
        assert_eq!(parse(r#"{"amount": 10.01}"#), Some(BigDecimal::from_str("10.01").unwrap()));
        assert_eq!(parse(r#"{"amount": 120}"#), Some(BigDecimal::from(120)));
    }

    #[test]
    fn test_string_and_missing_values() {
        assert_eq!(parse(r#"{"amount": " 99.50 "}"#), Some(BigDecimal::from_str("99.5").unwrap()));
        assert_eq!(parse(r#"{"amount": ""}"#), None);
        assert_eq!(parse(r#"{"amount": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"amount": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"amount": [1]}"#).is_err());
    }

    #[test]
    fn test_to_cents() {
        assert_eq!(to_cents(&BigDecimal::from(100)).to_string(), "100.00");
        assert_eq!(to_cents(&BigDecimal::from_str("10.009").unwrap()).to_string(), "10.01");
    }
}
