//! Prompt template rendering.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A named prompt template with `{{variable}}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    content: String,
}

impl PromptTemplate {
    /// Creates a new prompt template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Returns the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template with the given variables.
    ///
    /// String values are substituted verbatim; other JSON values use their
    /// serialized form. Placeholders with no matching variable are left
    /// in place.
    #[must_use]
    pub fn render(&self, variables: &HashMap<String, JsonValue>) -> String {
        let mut result = self.content.clone();
        for (name, value) in variables {
            let placeholder = format!("{{{{{name}}}}}");
            let replacement = match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            result = result.replace(&placeholder, &replacement);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_string_and_number_variables() {
        let template = PromptTemplate::new(
            "assistant_system",
            "Today is {{today}}. The current year is {{current_year}}.",
        );

        let mut vars = HashMap::new();
        vars.insert("today".to_string(), serde_json::json!("2030-06-10"));
        vars.insert("current_year".to_string(), serde_json::json!(2030));

        let rendered = template.render(&vars);
        assert_eq!(rendered, "Today is 2030-06-10. The current year is 2030.");
    }

    #[test]
    fn unknown_placeholders_are_left_in_place() {
        let template = PromptTemplate::new("t", "Hello {{name}}");
        let rendered = template.render(&HashMap::new());
        assert_eq!(rendered, "Hello {{name}}");
    }
}
