use serde_json::{Map, Value};

/// How a multi-valued field (`job_groups`, `most_frequent_topics`) showed up in a record.
///
/// Feeds disagree: most send an array, some send a single object, some omit the field.
/// The shape is decided once here and everything downstream sees a plain list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape<'a> {
    ArrayOfGroups(&'a [Value]),
    /// Always holds a `Value::Object`.
    SingleGroupObject(&'a Value),
    Absent,
}

impl<'a> FieldShape<'a> {
    /// Classify `value`. A lone object only counts if it has at least one of
    /// `marker_keys`; anything else (strings, numbers, empty objects) is `Absent`.
    pub fn inspect(value: Option<&'a Value>, marker_keys: &[&str]) -> Self {
        match value {
            Some(Value::Array(items)) => FieldShape::ArrayOfGroups(items),
            Some(object @ Value::Object(map)) if marker_keys.iter().any(|k| map.contains_key(*k)) => {
                FieldShape::SingleGroupObject(object)
            }
            _ => FieldShape::Absent,
        }
    }

    /// The entries as a list: arrays minus nulls, a lone object wrapped, absent → empty.
    pub fn items(self) -> Vec<&'a Value> {
        match self {
            FieldShape::ArrayOfGroups(items) => items.iter().filter(|v| !v.is_null()).collect(),
            FieldShape::SingleGroupObject(object) => vec![object],
            FieldShape::Absent => Vec::new(),
        }
    }
}

/// A number, or a string that parses as one. Non-finite results are rejected.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Strict number: only JSON numbers count.
pub fn as_json_number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|n| n.is_finite())
}

/// A non-empty trimmed string, also accepting numbers (codes such as `840`).
pub fn as_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// First field among `keys` that yields text.
pub fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| as_text(map.get(*k)))
}

/// First field among `keys` that yields a number.
pub fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| as_number(map.get(*k)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shapes_are_classified() {
        let array = json!([{ "name": "A" }, null, { "name": "B" }]);
        let single = json!({ "name": "X", "share": 10 });
        let junk = json!("nope");

        assert!(matches!(FieldShape::inspect(Some(&array), &["name"]), FieldShape::ArrayOfGroups(_)));
        assert_eq!(FieldShape::inspect(Some(&array), &["name"]).items().len(), 2);
        assert!(matches!(
            FieldShape::inspect(Some(&single), &["name"]),
            FieldShape::SingleGroupObject(_)
        ));
        assert_eq!(FieldShape::inspect(Some(&json!({})), &["name"]), FieldShape::Absent);
        assert_eq!(FieldShape::inspect(Some(&junk), &["name"]), FieldShape::Absent);
        assert_eq!(FieldShape::inspect(None, &["name"]), FieldShape::Absent);
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        assert_eq!(as_number(Some(&json!(12.5))), Some(12.5));
        assert_eq!(as_number(Some(&json!(" 7.5% "))), Some(7.5));
        assert_eq!(as_number(Some(&json!("n/a"))), None);
        assert_eq!(as_json_number(Some(&json!("3"))), None);
        assert_eq!(as_text(Some(&json!(840))), Some("840".to_string()));
        assert_eq!(as_text(Some(&json!("  "))), None);
    }
}
