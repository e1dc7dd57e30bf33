//! Raw records and scalar field values.
//!
//! A [`RawRecord`] is one row of a section table exactly as the store holds
//! it: a designation plus a bag of scalar fields. Nothing here knows about
//! schemas; typing and validation happen in [`crate::schema`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single scalar in a raw record.
///
/// Serialized untagged, so `67.1`, `42`, `"UB"`, `true` and `null` map
/// directly to and from JSON. Integers are tried before floats so whole
/// numbers in the store stay integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Short name of the stored kind, used in violation messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view: integers and floats only, text is not parsed here
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric view that also accepts numeric text (`"67.1"`)
    pub fn to_number(&self) -> Option<f64> {
        match self {
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            other => other.as_f64(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Infer a value from a command-line or query-string token.
    ///
    /// `"100"` becomes an integer, `"67.1"` a float, `"true"`/`"false"` a
    /// bool, `"null"` null, anything else text.
    pub fn infer(token: &str) -> FieldValue {
        let trimmed = token.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return FieldValue::Float(f);
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "true" => FieldValue::Bool(true),
            "false" => FieldValue::Bool(false),
            "null" => FieldValue::Null,
            _ => FieldValue::Text(token.to_string()),
        }
    }

    /// Convert a JSON scalar. Arrays and objects are not scalars.
    pub fn from_json(value: serde_json::Value) -> Option<FieldValue> {
        match value {
            serde_json::Value::Null => Some(FieldValue::Null),
            serde_json::Value::Bool(b) => Some(FieldValue::Bool(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Integer(i)),
                None => n.as_f64().map(FieldValue::Float),
            },
            serde_json::Value::String(s) => Some(FieldValue::Text(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One stored row: designation plus untyped fields.
///
/// Serializes flat (`{"designation": "457x191x67", "h": 453.4, ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub designation: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new(designation: impl Into<String>) -> Self {
        RawRecord {
            designation: designation.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Field lookup that treats `designation` as a text field
    pub fn value(&self, field: &str) -> Option<FieldValue> {
        if field == "designation" {
            return Some(FieldValue::Text(self.designation.clone()));
        }
        self.fields.get(field).cloned()
    }

    /// Build a record from one entry of a JSON table (`"457x191x67": {...}`).
    ///
    /// A `designation` field inside the object is optional but must agree
    /// with the key. Nested arrays or objects make the record malformed.
    pub fn from_json_entry(key: &str, value: serde_json::Value) -> Result<RawRecord, String> {
        let object = match value {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(format!(
                    "record '{}' is not an object (found {})",
                    key,
                    json_kind(&other)
                ))
            }
        };

        let mut record = RawRecord::new(key);
        for (field, raw) in object {
            if field == "designation" {
                match raw.as_str() {
                    Some(d) if d == key => continue,
                    Some(d) => {
                        return Err(format!(
                            "record '{}' carries mismatched designation '{}'",
                            key, d
                        ))
                    }
                    None => {
                        return Err(format!("record '{}' has a non-text designation", key));
                    }
                }
            }
            let kind = json_kind(&raw);
            let value = FieldValue::from_json(raw).ok_or_else(|| {
                format!("record '{}' field '{}' is not a scalar (found {})", key, field, kind)
            })?;
            record.fields.insert(field, value);
        }
        Ok(record)
    }

    /// JSON object form without the designation (the table-entry value)
    pub fn to_json_fields(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), field_to_json(v)))
            .collect();
        serde_json::Value::Object(map)
    }
}

fn field_to_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Null => serde_json::Value::Null,
        FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        FieldValue::Integer(i) => serde_json::Value::from(*i),
        FieldValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        FieldValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_values_keep_integers() {
        let v: FieldValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, FieldValue::Integer(42));
        let v: FieldValue = serde_json::from_str("67.1").unwrap();
        assert_eq!(v, FieldValue::Float(67.1));
        let v: FieldValue = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        let v: FieldValue = serde_json::from_str("\"457x191x67\"").unwrap();
        assert_eq!(v.as_str(), Some("457x191x67"));
    }

    #[test]
    fn test_infer_tokens() {
        assert_eq!(FieldValue::infer("100"), FieldValue::Integer(100));
        assert_eq!(FieldValue::infer("67.1"), FieldValue::Float(67.1));
        assert_eq!(FieldValue::infer("TRUE"), FieldValue::Bool(true));
        assert_eq!(FieldValue::infer("457x191x67"), FieldValue::Text("457x191x67".into()));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::Text("3.5".into()).as_f64(), None);
        assert_eq!(FieldValue::Text(" 3.5 ".into()).to_number(), Some(3.5));
        assert_eq!(FieldValue::Text("abc".into()).to_number(), None);
        assert_eq!(FieldValue::Bool(true).to_number(), None);
    }

    #[test]
    fn test_from_json_entry() {
        let record = RawRecord::from_json_entry(
            "457x191x67",
            json!({"designation": "457x191x67", "mass_per_metre": 67.1, "serial_size": "457x191"}),
        )
        .unwrap();
        assert_eq!(record.designation, "457x191x67");
        assert!(record.get("designation").is_none());
        assert_eq!(record.get("mass_per_metre"), Some(&FieldValue::Float(67.1)));
        assert_eq!(record.value("designation"), Some(FieldValue::Text("457x191x67".into())));
    }

    #[test]
    fn test_from_json_entry_rejects_malformed() {
        assert!(RawRecord::from_json_entry("a", json!([1, 2])).is_err());
        assert!(RawRecord::from_json_entry("a", json!({"designation": "b"})).is_err());
        let err = RawRecord::from_json_entry("a", json!({"h": {"value": 1}})).unwrap_err();
        assert!(err.contains("'h'"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = RawRecord::new("203x203x46").with("A", 58.7).with("h", 203.2);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["designation"], "203x203x46");
        assert_eq!(json["A"], 58.7);
        let back: RawRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
