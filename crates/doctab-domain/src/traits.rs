//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (doctab-llm). Providers are
/// stateless with respect to documents: each call is independent and any
/// transport-level retrying happens inside `generate`.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for `prompt` under the given system prompt
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error>;

    /// Identifier of the model answering requests, for logs
    fn model_name(&self) -> &str;
}

impl<T: LlmProvider + ?Sized> LlmProvider for &T {
    type Error = T::Error;

    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(prompt, system_prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
