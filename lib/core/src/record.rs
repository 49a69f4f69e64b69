use crate::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// Named-field access to an externally owned record.
///
/// Any field can be asked for by name. A field the record does not have
/// reads as the empty string, never as an error.
pub trait Record: Send + Sync + 'static {
    fn get_field(&self, name: &str) -> Cow<'_, str>;
}

/// Stable identity of a record: the address of the `Arc` allocation
/// holding it.
///
/// Two clones of the same `Arc` share an id; two equal records in
/// separate allocations do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    #[inline]
    #[must_use]
    pub fn of<R: ?Sized>(record: &Arc<R>) -> Self {
        Self(Arc::as_ptr(record) as *const () as usize)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Element-wise identity comparison of two record sequences.
pub fn same_records<R: ?Sized>(a: &[Arc<R>], b: &[Arc<R>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

impl Record for Value {
    /// Strings are returned as-is, numbers and booleans in their JSON
    /// spelling. Null, nested values and absent fields read as empty.
    fn get_field(&self, name: &str) -> Cow<'_, str> {
        match self.get(name) {
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
            _ => Cow::Borrowed(""),
        }
    }
}

impl Record for HashMap<String, String> {
    fn get_field(&self, name: &str) -> Cow<'_, str> {
        self.get(name).map_or(Cow::Borrowed(""), |v| Cow::Borrowed(v.as_str()))
    }
}

impl Record for BTreeMap<String, String> {
    fn get_field(&self, name: &str) -> Cow<'_, str> {
        self.get(name).map_or(Cow::Borrowed(""), |v| Cow::Borrowed(v.as_str()))
    }
}

/// Parse a JSON array of objects into shareable records.
pub fn records_from_json_str(json: &str) -> Result<Vec<Arc<Value>>> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(entries) = value else {
        return Err(Error::InvalidRecords("expected a JSON array of objects".to_string()));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            if entry.is_object() {
                Ok(Arc::new(entry))
            } else {
                Err(Error::InvalidRecords(format!("entry {} is not an object", i)))
            }
        })
        .collect()
}

/// Load records from a file holding a JSON array of objects.
pub fn records_from_json_file<P: AsRef<Path>>(path: P) -> Result<Vec<Arc<Value>>> {
    let text = std::fs::read_to_string(path)?;
    records_from_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_field_access() {
        let record = json!({"name": "Firefox", "pid": 42, "active": true, "meta": {"a": 1}});
        assert_eq!(record.get_field("name"), "Firefox");
        assert_eq!(record.get_field("pid"), "42");
        assert_eq!(record.get_field("active"), "true");
        assert_eq!(record.get_field("meta"), "");
        assert_eq!(record.get_field("missing"), "");
    }

    #[test]
    fn test_map_field_access() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "Terminal".to_string());
        assert_eq!(map.get_field("name"), "Terminal");
        assert_eq!(map.get_field("desc"), "");

        let tree: BTreeMap<String, String> = map.into_iter().collect();
        assert_eq!(tree.get_field("name"), "Terminal");
        assert_eq!(tree.get_field("desc"), "");
    }

    #[test]
    fn test_record_identity() {
        let a = Arc::new(json!({"name": "same"}));
        let b = Arc::new(json!({"name": "same"}));
        assert_eq!(RecordId::of(&a), RecordId::of(&a.clone()));
        assert_ne!(RecordId::of(&a), RecordId::of(&b));

        assert!(same_records(&[a.clone(), b.clone()], &[a.clone(), b.clone()]));
        assert!(!same_records(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));
        assert!(!same_records(&[a.clone()], &[a, b]));
    }

    #[test]
    fn test_records_from_json() {
        let records = records_from_json_str(r#"[{"name": "Files"}, {"name": "Terminal"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_field("name"), "Terminal");

        assert!(matches!(
            records_from_json_str(r#"{"name": "Files"}"#),
            Err(Error::InvalidRecords(_))
        ));
        assert!(matches!(
            records_from_json_str(r#"[{"name": "Files"}, 3]"#),
            Err(Error::InvalidRecords(_))
        ));
        assert!(matches!(records_from_json_str("[{"), Err(Error::Json(_))));
    }
}
