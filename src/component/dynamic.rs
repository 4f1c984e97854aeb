use crate::component::api::{ActionResult, Component};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::value::Value;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declarative action of a [`DynamicComponent`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Keys to overwrite when the action fires.
    #[serde(default)]
    pub assign: Map<String, Value>,
    /// Page to navigate to afterwards; `None` stays on the current page.
    #[serde(default)]
    pub goto: Option<String>,
    /// If set, the action fails with this message instead of running.
    #[serde(default)]
    pub fail: Option<String>,
}

/// Component whose state is a JSON object and whose actions are scripted.
///
/// Unknown keys resolve to `null`, matching dictionary semantics.
#[derive(Debug, Clone)]
pub struct DynamicComponent {
    name: String,
    state: Map<String, Value>,
    actions: Arc<BTreeMap<String, ScriptedAction>>,
    awake_count: u32,
    sleep_count: u32,
}

impl DynamicComponent {
    /// Create a component with initial `state` and no actions.
    pub fn new(name: impl Into<String>, state: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            state,
            actions: Arc::new(BTreeMap::new()),
            awake_count: 0,
            sleep_count: 0,
        }
    }

    /// Attach the (shared) action table.
    pub fn with_actions(mut self, actions: Arc<BTreeMap<String, ScriptedAction>>) -> Self {
        self.actions = actions;
        self
    }

    /// Current state.
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// How many times the instance was awoken.
    pub fn awake_count(&self) -> u32 {
        self.awake_count
    }

    /// How many times the instance was put to sleep.
    pub fn sleep_count(&self) -> u32 {
        self.sleep_count
    }
}

impl Component for DynamicComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn value_for_key(&self, key: &str) -> TrellisResult<Value> {
        Ok(self.state.get(key).cloned().unwrap_or(Value::Null))
    }

    fn take_value_for_key(&mut self, key: &str, value: Value) -> TrellisResult<()> {
        self.state.insert(key.to_owned(), value);
        Ok(())
    }

    fn perform(&mut self, action: &str) -> TrellisResult<ActionResult> {
        let Some(script) = self.actions.get(action).cloned() else {
            return Err(TrellisError::evaluation(format!(
                "component '{}' has no action '{action}'",
                self.name
            )));
        };
        if let Some(msg) = script.fail {
            return Err(TrellisError::evaluation(format!(
                "action '{action}' failed: {msg}"
            )));
        }
        for (k, v) in script.assign {
            self.state.insert(k, v);
        }
        Ok(match script.goto {
            Some(page) => ActionResult::Goto(page),
            None => ActionResult::Stay,
        })
    }

    fn awake(&mut self) {
        self.awake_count += 1;
    }

    fn sleep(&mut self) {
        self.sleep_count += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/dynamic.rs"]
mod tests;
