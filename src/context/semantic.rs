use crate::component::api::Component;
use crate::foundation::value::{Value, string_value};

/// Derives a semantic label from a repetition key for record/playback scoping.
pub trait SemanticKeyProvider: Send + Sync {
    /// Label for `key` within `component`, or `None` to leave the scope unlabelled.
    fn semantic_key(&self, key: &Value, component: &dyn Component) -> Option<String>;
}

/// Uses the key's text form, restricted to `[A-Za-z0-9_]` and at most 32 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSemanticKeys;

const MAX_LABEL_LEN: usize = 32;

impl SemanticKeyProvider for DefaultSemanticKeys {
    fn semantic_key(&self, key: &Value, _component: &dyn Component) -> Option<String> {
        let label: String = string_value(key)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(MAX_LABEL_LEN)
            .collect();
        let label = label.trim_matches('_');
        (!label.is_empty()).then(|| label.to_owned())
    }
}

/// A UI-element label captured during a recording render.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordedLabel {
    /// Element id the label was recorded for (dotted form).
    pub element_id: String,
    /// Label, prefixed by the enclosing semantic scopes.
    pub label: String,
}
