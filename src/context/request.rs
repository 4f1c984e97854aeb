use std::collections::BTreeMap;

/// Submitted request data as seen by the element tree.
///
/// Form values are keyed by the element id (dotted form) of the control that rendered them; the
/// sender id names the control that triggered the action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    form_values: BTreeMap<String, Vec<String>>,
    sender_id: Option<String>,
}

impl Request {
    /// Empty request (a plain page fetch).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one submitted value for element `id`.
    pub fn with_form_value(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_values
            .entry(id.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Set the id of the control that triggered this request.
    pub fn with_sender_id(mut self, id: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self
    }

    /// Submitted form values by element id.
    pub fn form_values(&self) -> &BTreeMap<String, Vec<String>> {
        &self.form_values
    }

    /// Raw sender id.
    pub fn sender_id(&self) -> Option<&str> {
        self.sender_id.as_deref()
    }

    /// `true` if the apply-values phase has anything to do.
    pub fn has_form_values(&self) -> bool {
        !self.form_values.is_empty()
    }
}
