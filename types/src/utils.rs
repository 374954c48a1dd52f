use crate::VideoRecord;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

impl From<HashMap<String, AttributeValue>> for VideoRecord {
    fn from(item: HashMap<String, AttributeValue>) -> Self {
        item.into_iter()
            .map(|(k, v)| (k, convert_attribute_value_to_json(v)))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

/// Converts a ``DynamoDB`` attribute value to a JSON value.
///
/// Numbers that fit an `i64` stay integers so that dimensions and flags
/// survive the trip unchanged. Binary values have no JSON counterpart and
/// become `null`.
///
/// # Arguments
///
/// * `attribute_value` - The ``DynamoDB`` attribute value to convert.
///
/// # Returns
///
/// A `serde_json::Value` representing the converted attribute value.
pub fn convert_attribute_value_to_json(
    attribute_value: AttributeValue,
) -> serde_json::Value {
    match attribute_value {
        AttributeValue::S(s) => serde_json::Value::String(s),
        AttributeValue::N(n) => convert_number(&n),
        AttributeValue::Bool(b) => serde_json::Value::Bool(b),
        AttributeValue::L(l) => serde_json::Value::Array(
            l.into_iter().map(convert_attribute_value_to_json).collect(),
        ),
        AttributeValue::M(m) => serde_json::Value::Object(
            m.into_iter()
                .map(|(k, v)| (k, convert_attribute_value_to_json(v)))
                .collect(),
        ),
        AttributeValue::Ss(ss) => serde_json::Value::Array(
            ss.into_iter().map(serde_json::Value::String).collect(),
        ),
        AttributeValue::Ns(ns) => serde_json::Value::Array(
            ns.iter().map(String::as_str).map(convert_number).collect(),
        ),
        _ => serde_json::Value::Null,
    }
}

fn convert_number(n: &str) -> serde_json::Value {
    if let Ok(i) = n.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }

    n.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(
            || serde_json::Value::String(n.to_string()),
            serde_json::Value::Number,
        )
}
