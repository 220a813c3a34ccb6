//! Records and the schema/records pairs built from them

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the field that numbers records, always present in every record
pub const RECORD_INDEX: &str = "record_index";

/// One extracted row: field name → JSON value, in discovery order
pub type Record = serde_json::Map<String, Value>;

/// Fill every record with an empty string for each schema field it lacks.
///
/// Existing values are never touched, so applying this twice is a no-op.
///
/// # Examples
///
/// ```
/// use doctab_domain::{backfill, Record};
/// use serde_json::json;
///
/// let mut records = vec![Record::new()];
/// backfill(&mut records, &["name".to_string()]);
/// assert_eq!(records[0]["name"], json!(""));
/// ```
pub fn backfill(records: &mut [Record], schema: &[String]) {
    for record in records.iter_mut() {
        for field in schema {
            record
                .entry(field.as_str())
                .or_insert_with(|| Value::String(String::new()));
        }
    }
}

/// Schema and records inferred from a single chunk.
///
/// This is also the on-disk shape of a cache entry:
/// `{"schema": [...], "records": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Unique field names in discovery order
    pub schema: Vec<String>,

    /// Records sharing the same key set
    pub records: Vec<Record>,
}

impl ExtractionResult {
    /// Create a result from its parts
    pub fn new(schema: Vec<String>, records: Vec<Record>) -> Self {
        Self { schema, records }
    }
}

/// Document-level table after every chunk has been merged.
///
/// `record_index` runs `1..=records.len()` without gaps and every record
/// carries every schema field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    /// Union of all chunk schemas, required fields first
    pub schema: Vec<String>,

    /// All records in chunk order
    pub records: Vec<Record>,
}

impl MergedResult {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record was extracted
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tabular view: one row per record, values looked up in schema order.
    ///
    /// Missing fields render as empty strings.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.records.iter().map(move |record| {
            self.schema
                .iter()
                .map(|field| {
                    record
                        .get(field)
                        .cloned()
                        .unwrap_or_else(|| Value::String(String::new()))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_backfill_adds_missing_fields_only() {
        let mut records = vec![record(json!({"a": 1})), record(json!({"b": "x"}))];
        let schema = vec!["a".to_string(), "b".to_string()];

        backfill(&mut records, &schema);

        assert_eq!(records[0], record(json!({"a": 1, "b": ""})));
        assert_eq!(records[1], record(json!({"b": "x", "a": ""})));
    }

    #[test]
    fn test_extraction_result_json_shape() {
        let result = ExtractionResult::new(
            vec!["record_index".into(), "name".into()],
            vec![record(json!({"record_index": 1, "name": "Alice"}))],
        );

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "schema": ["record_index", "name"],
                "records": [{"record_index": 1, "name": "Alice"}]
            })
        );
    }

    #[test]
    fn test_rows_follow_schema_order() {
        let merged = MergedResult {
            schema: vec!["record_index".into(), "name".into(), "age".into()],
            records: vec![record(json!({"name": "Bob", "record_index": 1}))],
        };

        let rows: Vec<_> = merged.rows().collect();
        assert_eq!(rows, vec![vec![json!(1), json!("Bob"), json!("")]]);
        assert_eq!(merged.len(), 1);
    }
}
