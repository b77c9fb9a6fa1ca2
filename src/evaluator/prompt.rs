use serde::{Deserialize, Serialize};

/// Instruction sent to the model for every sentence.
pub const DEFAULT_TEMPLATE: &str = "Translate the following {source} sentences to pure {target} line by line. Do not output any additional text other than the translations:\n{sentence}";

/// Single-turn translation prompt with `{source}`, `{target}` and
/// `{sentence}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, source: &str, target: &str, sentence: &str) -> String {
        // Sentence last so placeholders inside user text stay literal.
        self.template
            .replace("{source}", source)
            .replace("{target}", target)
            .replace("{sentence}", sentence)
    }
}
