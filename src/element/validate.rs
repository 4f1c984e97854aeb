use crate::component::registry::ComponentRegistry;
use crate::foundation::location::TemplateLocation;
use serde::Serialize;
use std::collections::BTreeMap;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One finding of the validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub component: String,
    pub location: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}", self.component)?;
        if let Some(loc) = &self.location {
            write!(f, " ({loc})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collects diagnostics while walking one component's template.
///
/// The registry, when present, lets reference checks resolve the referenced component.
pub struct ValidationContext<'a> {
    component: String,
    registry: Option<&'a ComponentRegistry>,
    location: Option<TemplateLocation>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(component: &str, registry: Option<&'a ComponentRegistry>) -> Self {
        Self {
            component: component.to_owned(),
            registry,
            location: None,
            diagnostics: Vec::new(),
        }
    }

    /// Registry used to resolve component references.
    pub fn registry(&self) -> Option<&'a ComponentRegistry> {
        self.registry
    }

    /// Component whose template is being validated.
    pub fn component(&self) -> &str {
        &self.component
    }

    pub(crate) fn set_location(&mut self, location: Option<TemplateLocation>) {
        self.location = location;
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            component: self.component.clone(),
            location: self.location.as_ref().map(ToString::to_string),
            message,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Diagnostics of a whole application, grouped by component.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub by_component: BTreeMap<String, Vec<Diagnostic>>,
}

impl ValidationReport {
    /// Record the findings of one component; components without findings are not listed.
    pub fn insert(&mut self, component: String, diagnostics: Vec<Diagnostic>) {
        if !diagnostics.is_empty() {
            self.by_component.insert(component, diagnostics);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_component.values().flatten()
    }

    pub fn error_count(&self) -> usize {
        self.iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.by_component.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/validate.rs"]
mod tests;
