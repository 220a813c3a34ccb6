//! LLM prompt engineering for table extraction

/// System prompt for extraction calls
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured data from documents. \
Return ONLY valid JSON. \
Output must be an object with keys 'schema' and 'records'. \
'schema' is a list of field names in snake_case. \
'records' is a list of objects using those fields. \
If a field is missing, use an empty string.";

/// System prompt for the JSON repair call
pub const REPAIR_SYSTEM_PROMPT: &str = "You repair JSON. Return ONLY valid JSON with no extra text.";

/// Builds the user prompt for one chunk
pub struct PromptBuilder {
    text: String,
    document_name: String,
    required_fields: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(text: String, document_name: String) -> Self {
        Self {
            text,
            document_name,
            required_fields: Vec::new(),
        }
    }

    /// Fields the model must always include
    pub fn with_required_fields(mut self, fields: Vec<String>) -> Self {
        self.required_fields = fields;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("Infer the best schema for the document and extract all logical records.\n");
        if !self.required_fields.is_empty() {
            prompt.push_str(&format!(
                "Always include the required fields: {}.\n",
                self.required_fields.join(", ")
            ));
        }
        prompt.push_str("Return JSON: { 'schema': [...], 'records': [{...}, ...] }.\n\n");

        prompt.push_str(&format!("Document name: {}\n\n", self.document_name));

        prompt.push_str("Document text:\n");
        prompt.push_str(&self.text);
        prompt.push('\n');

        prompt
    }
}

/// User prompt asking the model to turn `bad_json` into valid JSON
pub fn repair_prompt(bad_json: &str) -> String {
    format!(
        "Fix the following so it is valid JSON only. \
         Do not add commentary or code fences.\n\n{}\n",
        bad_json
    )
}
