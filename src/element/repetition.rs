use crate::binding::bind::{Binding, BindingSet, BindingSource};
use crate::component::api::{ActionResult, Component};
use crate::context::request_context::RequestContext;
use crate::element::node::{Cycleable, DebugDescription, Element};
use crate::element::validate::ValidationContext;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::location::TemplateLocation;
use crate::foundation::value::{self, Value};

/// Repeats `content` once per entry of the keyed collection bound to `list`.
///
/// Objects iterate their keys, arrays their indices. Before each iteration the key is written
/// through `key` (and the entry through `value`, when bound). The repetition occupies one id
/// slot in its parent and every iteration one slot inside that.
#[derive(Debug)]
pub struct Repetition {
    list: Binding,
    key: Binding,
    value: Option<Binding>,
    sorted: Option<Binding>,
    pub(crate) content: Box<Element>,
    pub(crate) location: Option<TemplateLocation>,
}

impl Repetition {
    pub fn new(mut bindings: BindingSet, content: Element) -> TrellisResult<Self> {
        let list = bindings.required("Repetition", "list")?;
        let key = bindings.required("Repetition", "key")?;
        if !key.is_settable() {
            return Err(TrellisError::configuration(
                "Repetition: 'key' must be a settable key path",
            ));
        }
        let value = bindings.take("value");
        if value.as_ref().is_some_and(|v| !v.is_settable()) {
            return Err(TrellisError::configuration(
                "Repetition: 'value' must be a settable key path",
            ));
        }
        let sorted = bindings.take("sorted");
        if let Some(name) = bindings.names().next() {
            return Err(TrellisError::configuration(format!(
                "Repetition: unknown binding '{name}'"
            )));
        }
        Ok(Self {
            list,
            key,
            value,
            sorted,
            content: Box::new(content),
            location: None,
        })
    }

    fn entries(&self, component: &dyn Component) -> TrellisResult<Vec<(Value, Value)>> {
        let mut entries: Vec<(Value, Value)> = match self.list.value(component)? {
            Value::Null => Vec::new(),
            Value::Object(map) => map.into_iter().map(|(k, v)| (Value::String(k), v)).collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Value::from(i), v))
                .collect(),
            other => {
                return Err(TrellisError::evaluation(format!(
                    "expected an object or array, got {}",
                    value::type_name(&other)
                ))
                .in_binding(self.list.name()));
            }
        };
        let sorted = match &self.sorted {
            Some(b) => b.bool_value(component)?,
            None => false,
        };
        if sorted {
            // stable: equal string forms keep collection order
            entries.sort_by_key(|(k, _)| value::string_value(k));
        }
        Ok(entries)
    }

    fn bind_entry(
        &self,
        key: Value,
        item: Value,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.key.set_value(key, component)?;
        if let Some(v) = &self.value {
            v.set_value(item, component)?;
        }
        Ok(())
    }
}

impl Cycleable for Repetition {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.run_scoped(|ctx| {
            let entries = self.entries(component)?;
            let total = entries.len();
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if ctx.apply_exhausted() {
                    ctx.note_siblings_skipped(total - i);
                    break;
                }
                ctx.run_scoped(|ctx| {
                    self.bind_entry(key, item, component)?;
                    self.content.apply_values(ctx, component)
                })?;
            }
            Ok(())
        })
        .map(|_| ())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        let found = ctx.run_scoped(|ctx| {
            for (key, item) in self.entries(component)? {
                let r = ctx.run_scoped(|ctx| {
                    self.bind_entry(key, item, component)?;
                    self.content.invoke_action(ctx, component)
                })?;
                if let Some(result) = r.flatten() {
                    return Ok(Some(result));
                }
            }
            Ok(None)
        })?;
        Ok(found.flatten())
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.run_scoped(|ctx| {
            for (key, item) in self.entries(component)? {
                let label = if ctx.is_recording() {
                    ctx.semantic_key_for(&key, component)
                } else {
                    None
                };
                ctx.run_scoped(|ctx| {
                    self.bind_entry(key, item, component)?;
                    let Some(label) = label else {
                        return self.content.render_response(ctx, component);
                    };
                    ctx.push_semantic_prefix(label);
                    let r = self.content.render_response(ctx, component);
                    ctx.pop_semantic_prefix();
                    r
                })?;
            }
            Ok(())
        })
        .map(|_| ())
    }

    fn validate(&self, vctx: &mut ValidationContext<'_>) {
        if let BindingSource::Constant(v) = self.list.source()
            && !matches!(v, Value::Array(_) | Value::Object(_) | Value::Null)
        {
            vctx.warning("Repetition: constant 'list' is neither an object nor an array");
        }
    }

    fn debug_description(&self) -> DebugDescription {
        let mut d = DebugDescription::from([
            ("list", self.list.to_string()),
            ("key", self.key.to_string()),
        ]);
        if let Some(v) = &self.value {
            d.insert("value", v.to_string());
        }
        if let Some(s) = &self.sorted {
            d.insert("sorted", s.to_string());
        }
        d
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/repetition.rs"]
mod tests;
