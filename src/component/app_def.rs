use crate::component::api::Component;
use crate::component::dynamic::{DynamicComponent, ScriptedAction};
use crate::component::registry::{ComponentDefinition, ComponentRegistry};
use crate::context::request_context::CycleOpts;
use crate::element::builder::{NodeDef, TemplateBuilder};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declarative application: components with JSON templates and [`DynamicComponent`] state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppDef {
    #[serde(default)]
    pub options: CycleOpts,
    /// Page rendered when none is named.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    pub components: BTreeMap<String, ComponentDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDef {
    pub template: NodeDef,
    /// Initial state of every new instance.
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default)]
    pub actions: BTreeMap<String, ScriptedAction>,
    /// Bindings a reference may pass; unchecked when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl AppDef {
    pub fn from_json_str(json: &str) -> TrellisResult<Self> {
        serde_json::from_str(json).map_err(|e| TrellisError::serde(format!("app definition: {e}")))
    }

    /// Name of the page to render by default: `main`, else the only component.
    pub fn main_page(&self) -> TrellisResult<&str> {
        if let Some(main) = &self.main {
            return Ok(main);
        }
        match self.components.keys().collect::<Vec<_>>().as_slice() {
            [only] => Ok(only.as_str()),
            _ => Err(TrellisError::configuration(
                "app definition has several components but no 'main'",
            )),
        }
    }

    /// Build every template and register one definition per component.
    #[tracing::instrument(skip(self), fields(components = self.components.len()))]
    pub fn build_registry(&self) -> TrellisResult<ComponentRegistry> {
        let mut registry = ComponentRegistry::new();
        for (name, def) in &self.components {
            let template = TemplateBuilder::new(name).build(&def.template)?;
            let state = def.state.clone();
            let actions = Arc::new(def.actions.clone());
            let component_name = name.clone();
            let factory = move || -> Box<dyn Component> {
                Box::new(
                    DynamicComponent::new(component_name.as_str(), state.clone())
                        .with_actions(Arc::clone(&actions)),
                )
            };
            let mut definition = ComponentDefinition::new(name.as_str(), template, factory)
                .with_required(def.required.iter().cloned());
            if let Some(api) = &def.api {
                definition = definition.with_api(api.iter().cloned());
            }
            registry.register(definition)?;
        }
        if let Some(main) = &self.main
            && registry.get(main).is_none()
        {
            return Err(TrellisError::configuration(format!(
                "main page '{main}' is not a component"
            )));
        }
        Ok(registry)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/app_def.rs"]
mod tests;
