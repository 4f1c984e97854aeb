use std::fmt;
use std::sync::Arc;

/// Template-source provenance of an element: the only identity metadata an element carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateLocation {
    /// Template name, shared by every element parsed from the same template.
    pub template: Arc<str>,
    /// 1-based source line.
    pub line: u32,
}

impl TemplateLocation {
    /// Create a location for `line` of `template`.
    pub fn new(template: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            template: template.into(),
            line,
        }
    }
}

impl fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.template, self.line)
    }
}
