//! Cross-chunk schema merging

/// Union `new` into `base`, then pin `required` to the front.
///
/// Fields of `base` keep their order; unseen fields of `new` are appended in
/// their own order. Each required field is removed and reinserted so it
/// appears exactly once, in declaration order, ahead of everything else.
///
/// # Examples
///
/// ```
/// use doctab_extractor::merge_schema;
///
/// let required = vec!["record_index".to_string()];
/// let merged = merge_schema(
///     &["a".to_string(), "b".to_string()],
///     &["b".to_string(), "c".to_string()],
///     &required,
/// );
/// assert_eq!(merged, vec!["record_index", "a", "b", "c"]);
/// ```
pub fn merge_schema(base: &[String], new: &[String], required: &[String]) -> Vec<String> {
    let mut merged = base.to_vec();

    for field in new {
        if !merged.contains(field) {
            merged.push(field.clone());
        }
    }

    for field in required.iter().rev() {
        merged.retain(|f| f != field);
        merged.insert(0, field.clone());
    }

    merged
}

/// Running document schema, fed one chunk schema at a time
#[derive(Debug, Clone)]
pub struct SchemaMerger {
    required: Vec<String>,
    schema: Vec<String>,
}

impl SchemaMerger {
    /// Start from an empty schema
    pub fn new(required: Vec<String>) -> Self {
        Self {
            required,
            schema: Vec::new(),
        }
    }

    /// Merge the next chunk's schema
    pub fn merge(&mut self, new: &[String]) {
        self.schema = merge_schema(&self.schema, new, &self.required);
    }

    /// Current merged schema
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Finish and take the merged schema
    pub fn into_schema(self) -> Vec<String> {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_union_preserves_discovery_order() {
        let merged = merge_schema(&fields(&["a", "b"]), &fields(&["b", "c"]), &[]);
        assert_eq!(merged, fields(&["a", "b", "c"]));
    }

    #[test]
    fn test_required_pinned_even_when_absent() {
        let merged = merge_schema(&[], &fields(&["x"]), &fields(&["record_index"]));
        assert_eq!(merged, fields(&["record_index", "x"]));
    }

    #[test]
    fn test_required_moved_to_front_once() {
        let required = fields(&["record_index", "page"]);
        let merged = merge_schema(
            &fields(&["a", "record_index"]),
            &fields(&["page", "b", "record_index"]),
            &required,
        );
        assert_eq!(merged, fields(&["record_index", "page", "a", "b"]));
    }

    #[test]
    fn test_duplicates_in_new_collapse() {
        let merged = merge_schema(&[], &fields(&["a", "a", "b"]), &[]);
        assert_eq!(merged, fields(&["a", "b"]));
    }

    #[test]
    fn test_merger_accumulates() {
        let mut merger = SchemaMerger::new(fields(&["record_index"]));
        merger.merge(&fields(&["record_index", "name"]));
        merger.merge(&fields(&["record_index", "age", "name"]));
        assert_eq!(merger.schema(), fields(&["record_index", "name", "age"]).as_slice());
        assert_eq!(merger.into_schema(), fields(&["record_index", "name", "age"]));
    }
}
