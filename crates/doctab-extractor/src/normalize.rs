//! Field-name canonicalization and response normalization
//!
//! The model is free to invent field names ("Invoice No.", "invoice-no",
//! " INVOICE NO "). Everything is folded into the `[a-z0-9_]` identifier
//! space here, so schemas from different chunks can be unioned by plain
//! string equality.

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use doctab_domain::{backfill, ExtractionResult, Record, RECORD_INDEX};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Canonicalize a field name into `[a-z0-9_]`.
///
/// Lowercase and trim, replace every run of other characters with a single
/// `_`, collapse repeated `_`, then trim `_` from both ends. Idempotent.
///
/// # Examples
///
/// ```
/// use doctab_extractor::normalize_field;
///
/// assert_eq!(normalize_field("  Invoice No. "), "invoice_no");
/// assert_eq!(normalize_field("__Total (EUR)__"), "total_eur");
/// ```
pub fn normalize_field(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());

    for c in lowered.chars() {
        let mapped = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            c
        } else {
            '_'
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    out.trim_matches('_').to_string()
}

/// Required/dropped field rules applied to every model response
#[derive(Debug, Clone)]
pub struct FieldPolicy {
    required: Vec<String>,
    dropped: HashSet<String>,
}

impl FieldPolicy {
    /// Create a policy; drop names are matched lowercase and trimmed
    pub fn new<I, S>(required: Vec<String>, dropped: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            required,
            dropped: dropped
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Policy described by a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.required_fields.clone(), &config.drop_fields)
    }

    /// Required fields in declaration order
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Whether a normalized field name is in the drop set
    pub fn is_dropped(&self, field: &str) -> bool {
        self.dropped.contains(field)
    }

    /// Normalize a parsed model response into a chunk result.
    ///
    /// Accepted shapes, tried in order: a bare list of records; an object
    /// with a `records` key (and optional `schema`); any other object, taken
    /// as a single record whose keys form the schema.
    ///
    /// # Errors
    ///
    /// `ExtractorError::Shape` for any other JSON value, or when `records`
    /// holds a non-empty value that is not a list. Empty values (`null`,
    /// `{}`, `""`, `0`, `false`) mean no records.
    pub fn normalize_response(&self, data: Value) -> Result<ExtractionResult, ExtractorError> {
        let (raw_schema, raw_records) = match data {
            Value::Array(items) => (Vec::new(), items),
            Value::Object(mut map) if map.contains_key("records") => {
                let records = match map.remove("records") {
                    Some(Value::Array(items)) => items,
                    Some(value) if is_truthy(&value) => {
                        return Err(ExtractorError::Shape("'records' must be a list".to_string()))
                    }
                    _ => Vec::new(),
                };
                let schema = match map.remove("schema") {
                    Some(Value::Array(fields)) => fields,
                    _ => Vec::new(),
                };
                (schema, records)
            }
            Value::Object(map) => {
                let schema = map.keys().cloned().map(Value::String).collect();
                (schema, vec![Value::Object(map)])
            }
            other => {
                return Err(ExtractorError::Shape(format!(
                    "Unexpected JSON shape from LLM: {}",
                    kind_of(&other)
                )))
            }
        };

        let schema = self.normalize_schema(&raw_schema);

        let mut records: Vec<Record> = raw_records
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .enumerate()
            .map(|(idx, map)| self.normalize_record(map, idx + 1))
            .collect();

        backfill(&mut records, &schema);

        debug!(
            "Normalized response: {} field(s), {} record(s)",
            schema.len(),
            records.len()
        );

        Ok(ExtractionResult::new(schema, records))
    }

    /// Normalize, dedupe and filter schema entries, then pin required fields
    fn normalize_schema(&self, raw: &[Value]) -> Vec<String> {
        let mut schema: Vec<String> = Vec::new();

        for field in raw.iter().filter_map(Value::as_str) {
            let normalized = normalize_field(field);
            if normalized.is_empty() || self.is_dropped(&normalized) {
                continue;
            }
            if !schema.contains(&normalized) {
                schema.push(normalized);
            }
        }

        for required in self.required.iter().rev() {
            if !schema.contains(required) {
                schema.insert(0, required.clone());
            }
        }

        schema
    }

    /// Normalize keys, drop disallowed fields, null → "" and default the index
    fn normalize_record(&self, raw: Map<String, Value>, position: usize) -> Record {
        let mut record = Record::new();

        for (key, value) in raw {
            let normalized = normalize_field(&key);
            if normalized.is_empty() || self.is_dropped(&normalized) {
                continue;
            }
            let value = match value {
                Value::Null => Value::String(String::new()),
                other => other,
            };
            record.insert(normalized, value);
        }

        record
            .entry(RECORD_INDEX)
            .or_insert_with(|| Value::from(position));

        record
    }
}

/// False for null, `false`, zero and empty strings, arrays and objects
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> FieldPolicy {
        FieldPolicy::from_config(&PipelineConfig::default())
    }

    #[test]
    fn test_normalize_field() {
        assert_eq!(normalize_field("Name"), "name");
        assert_eq!(normalize_field("  First Name  "), "first_name");
        assert_eq!(normalize_field("e-mail / phone"), "e_mail_phone");
        assert_eq!(normalize_field("a__b___c"), "a_b_c");
        assert_eq!(normalize_field("Größe (cm)"), "gr_e_cm");
        assert_eq!(normalize_field("!!!"), "");
        assert_eq!(normalize_field("record_index"), "record_index");
    }

    #[test]
    fn test_records_object() {
        let data = json!({
            "schema": ["Name", "Age"],
            "records": [
                {"Name": "Alice", "Age": "30"},
                {"Name": "Bob", "Age": "25"}
            ]
        });

        let result = policy().normalize_response(data).unwrap();
        assert_eq!(result.schema, vec!["record_index", "name", "age"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["name"], json!("Alice"));
        assert_eq!(result.records[0]["record_index"], json!(1));
        assert_eq!(result.records[1]["record_index"], json!(2));
    }

    #[test]
    fn test_bare_list() {
        let data = json!([{"City": "Oslo"}, {"Country": "Norway"}]);
        let result = policy().normalize_response(data).unwrap();

        // Schema only holds what the model declared, plus required fields
        assert_eq!(result.schema, vec!["record_index"]);
        assert_eq!(result.records[0], json!({"city": "Oslo", "record_index": 1}).as_object().cloned().unwrap());
        assert_eq!(result.records[1]["country"], json!("Norway"));
    }

    #[test]
    fn test_plain_object_is_single_record() {
        let data = json!({"Invoice No": "A-1", "Total": 12.5});
        let result = policy().normalize_response(data).unwrap();

        assert_eq!(result.schema, vec!["record_index", "invoice_no", "total"]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0]["total"], json!(12.5));
        assert_eq!(result.records[0]["record_index"], json!(1));
    }

    #[test]
    fn test_unexpected_shapes() {
        for data in [json!("text"), json!(42), json!(null), json!(true)] {
            assert!(matches!(
                policy().normalize_response(data),
                Err(ExtractorError::Shape(_))
            ));
        }
    }

    #[test]
    fn test_records_not_a_list() {
        for records in [json!({"a": 1}), json!("rows"), json!(3), json!(true)] {
            let data = json!({"schema": ["a"], "records": records});
            assert!(matches!(
                policy().normalize_response(data),
                Err(ExtractorError::Shape(_))
            ));
        }
    }

    #[test]
    fn test_empty_records_value_means_no_records() {
        for records in [json!({}), json!(""), json!(0), json!(0.0), json!(false)] {
            let data = json!({"schema": ["a"], "records": records});
            let result = policy().normalize_response(data).unwrap();
            assert_eq!(result.schema, vec!["record_index", "a"]);
            assert!(result.records.is_empty());
        }
    }

    #[test]
    fn test_null_records_and_schema_default_to_empty() {
        let data = json!({"schema": null, "records": null});
        let result = policy().normalize_response(data).unwrap();
        assert_eq!(result.schema, vec!["record_index"]);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_drops_document_name_everywhere() {
        let data = json!({
            "schema": ["Document Name", "document_name", "Title"],
            "records": [{"DOCUMENT_NAME": "x.pdf", "Title": "T"}]
        });
        let result = policy().normalize_response(data).unwrap();

        assert_eq!(result.schema, vec!["record_index", "title"]);
        assert!(!result.records[0].contains_key("document_name"));
    }

    #[test]
    fn test_non_string_entries_discarded() {
        let data = json!({
            "schema": ["a", 1, null, {"b": 2}, "a", "A "],
            "records": [{"a": null}, "not a record", 7, {"a": "x"}]
        });
        let result = policy().normalize_response(data).unwrap();

        assert_eq!(result.schema, vec!["record_index", "a"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["a"], json!(""));
        assert_eq!(result.records[1]["record_index"], json!(2));
    }

    #[test]
    fn test_model_supplied_index_kept() {
        let data = json!({"schema": ["Record Index", "v"], "records": [{"Record Index": 7, "v": 1}]});
        let result = policy().normalize_response(data).unwrap();
        assert_eq!(result.schema, vec!["record_index", "v"]);
        assert_eq!(result.records[0]["record_index"], json!(7));
    }

    #[test]
    fn test_records_backfilled_to_schema() {
        let data = json!({
            "schema": ["a", "b", "c"],
            "records": [{"a": 1}, {"b": 2, "extra": 3}]
        });
        let result = policy().normalize_response(data).unwrap();

        for record in &result.records {
            for field in &result.schema {
                assert!(record.contains_key(field), "missing {}", field);
            }
        }
        assert_eq!(result.records[0]["c"], json!(""));
        // Undeclared keys survive on their record
        assert_eq!(result.records[1]["extra"], json!(3));
    }

    #[test]
    fn test_required_fields_pinned_in_declaration_order() {
        let policy = FieldPolicy::new(
            vec!["record_index".into(), "source_page".into()],
            Vec::<String>::new(),
        );
        let result = policy
            .normalize_response(json!({"schema": ["x"], "records": [{"x": 1}]}))
            .unwrap();

        assert_eq!(result.schema, vec!["record_index", "source_page", "x"]);
        assert_eq!(result.records[0]["source_page"], json!(""));
    }
}
