use crate::component::api::Component;
use crate::element::node::Element;
use crate::element::validate::{ValidationContext, ValidationReport};
use crate::foundation::error::{TrellisError, TrellisResult};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Creates fresh component instances.
pub type ComponentFactory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// A reusable component: its shared template plus a factory for its state object.
pub struct ComponentDefinition {
    name: String,
    template: Arc<Element>,
    factory: ComponentFactory,
    api: Option<BTreeSet<String>>,
    required: BTreeSet<String>,
}

impl ComponentDefinition {
    /// Define component `name` rendering `template` with instances made by `factory`.
    pub fn new(
        name: impl Into<String>,
        template: Element,
        factory: impl Fn() -> Box<dyn Component> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            template: Arc::new(template),
            factory: Arc::new(factory),
            api: None,
            required: BTreeSet::new(),
        }
    }

    /// Declare the bindings a reference to this component may pass.
    pub fn with_api<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Declare the bindings a reference to this component must pass.
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared template.
    pub fn template(&self) -> &Arc<Element> {
        &self.template
    }

    /// Declared binding api, if any.
    pub fn api(&self) -> Option<&BTreeSet<String>> {
        self.api.as_ref()
    }

    /// Bindings a reference must pass.
    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /// New state instance.
    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("api", &self.api)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Every component definition of an application, by name.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    definitions: BTreeMap<String, Arc<ComponentDefinition>>,
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; names must be unique.
    pub fn register(&mut self, definition: ComponentDefinition) -> TrellisResult<()> {
        if self.definitions.contains_key(definition.name()) {
            return Err(TrellisError::configuration(format!(
                "duplicate component '{}'",
                definition.name()
            )));
        }
        self.definitions
            .insert(definition.name().to_owned(), Arc::new(definition));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, definition: ComponentDefinition) -> TrellisResult<Self> {
        self.register(definition)?;
        Ok(self)
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentDefinition>> {
        self.definitions.get(name)
    }

    /// Look up a definition that must exist.
    pub fn definition(&self, name: &str) -> TrellisResult<Arc<ComponentDefinition>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| TrellisError::configuration(format!("unknown component '{name}'")))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Run the validation pass over every template, one component per task.
    #[tracing::instrument(skip(self), fields(components = self.definitions.len()))]
    pub fn validate_all(&self) -> ValidationReport {
        let per_component: Vec<_> = self
            .definitions
            .par_iter()
            .map(|(name, def)| {
                let mut vctx = ValidationContext::new(name, Some(self));
                def.template().validate(&mut vctx);
                (name.clone(), vctx.into_diagnostics())
            })
            .collect();

        let mut report = ValidationReport::default();
        for (name, diagnostics) in per_component {
            report.insert(name, diagnostics);
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/registry.rs"]
mod tests;
