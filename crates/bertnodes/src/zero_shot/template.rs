//! # Hypothesis Templates

use crate::errors::{BNResult, BertNodesError};

/// The default hypothesis template.
pub const DEFAULT_HYPOTHESIS: &str = "This example is {}";

const PLACEHOLDER: &str = "{}";

/// A hypothesis template with exactly one `{}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HypothesisTemplate {
    template: String,
}

impl Default for HypothesisTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_HYPOTHESIS.to_string(),
        }
    }
}

impl HypothesisTemplate {
    /// Validate and wrap a template.
    pub fn new<S: Into<String>>(template: S) -> BNResult<Self> {
        let template = template.into();
        match template.matches(PLACEHOLDER).count() {
            1 => Ok(Self { template }),
            0 => Err(BertNodesError::Config(format!(
                "hypothesis template {template:?} has no {PLACEHOLDER} placeholder for the label"
            ))),
            n => Err(BertNodesError::Config(format!(
                "hypothesis template {template:?} has {n} {PLACEHOLDER} placeholders, expected one"
            ))),
        }
    }

    /// The template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute `label` for the placeholder.
    pub fn render(
        &self,
        label: &str,
    ) -> String {
        self.template.replacen(PLACEHOLDER, label, 1)
    }
}
