use crate::binding::keypath::KeyPath;
use crate::component::api::{ActionResult, Component};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::value::{self, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where a binding's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSource {
    /// A literal fixed at template-parse time.
    Constant(Value),
    /// A key path rooted at the current component.
    KeyPath(KeyPath),
}

/// A named, stateless handle to a value expression.
///
/// Bindings hold no per-evaluation state: the component is always passed in, so one instance can
/// be evaluated by any number of concurrent requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    name: Arc<str>,
    source: BindingSource,
}

impl Binding {
    /// Constant binding.
    pub fn constant(name: &str, value: impl Into<Value>) -> Self {
        Self {
            name: Arc::from(name),
            source: BindingSource::Constant(value.into()),
        }
    }

    /// Key-path binding.
    pub fn key_path(name: &str, path: &str) -> TrellisResult<Self> {
        Ok(Self {
            name: Arc::from(name),
            source: BindingSource::KeyPath(KeyPath::parse(path)?),
        })
    }

    /// Interpret template notation: a string starting with `$` is a key path, `$$` escapes a
    /// literal `$`, anything else is a constant.
    pub fn parse(name: &str, raw: Value) -> TrellisResult<Self> {
        match raw {
            Value::String(s) if s.starts_with("$$") => Ok(Self::constant(name, &s[1..])),
            Value::String(s) if s.starts_with('$') => Self::key_path(name, &s[1..]),
            other => Ok(Self::constant(name, other)),
        }
    }

    /// Binding name (the attribute it was declared under).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value source.
    pub fn source(&self) -> &BindingSource {
        &self.source
    }

    /// `true` for literal bindings.
    pub fn is_constant(&self) -> bool {
        matches!(self.source, BindingSource::Constant(_))
    }

    /// `true` if [`set_value`](Self::set_value) can succeed.
    pub fn is_settable(&self) -> bool {
        matches!(self.source, BindingSource::KeyPath(_))
    }

    /// Evaluate against `component` (ignored for constants).
    pub fn value(&self, component: &dyn Component) -> TrellisResult<Value> {
        match &self.source {
            BindingSource::Constant(v) => Ok(v.clone()),
            BindingSource::KeyPath(kp) => {
                kp.value(component).map_err(|e| e.in_binding(&self.name))
            }
        }
    }

    /// Write back through the key path. Constant bindings refuse the write.
    pub fn set_value(&self, value: Value, component: &mut dyn Component) -> TrellisResult<()> {
        match &self.source {
            BindingSource::Constant(_) => Err(TrellisError::NotSettable {
                binding: self.name.to_string(),
            }),
            BindingSource::KeyPath(kp) => kp
                .set_value(value, component)
                .map_err(|e| e.in_binding(&self.name)),
        }
    }

    /// Text view; absent values are the empty string.
    pub fn string_value(&self, component: &dyn Component) -> TrellisResult<String> {
        Ok(value::string_value(&self.value(component)?))
    }

    /// Flag view; absent values are `false`.
    pub fn bool_value(&self, component: &dyn Component) -> TrellisResult<bool> {
        Ok(value::bool_value(&self.value(component)?))
    }

    /// Fire this binding as an action.
    ///
    /// A constant names the page to navigate to; a single-key path names an action method on the
    /// component.
    pub fn invoke(&self, component: &mut dyn Component) -> TrellisResult<ActionResult> {
        match &self.source {
            BindingSource::Constant(Value::Null) => Ok(ActionResult::Stay),
            BindingSource::Constant(v) => Ok(ActionResult::Goto(value::string_value(v))),
            BindingSource::KeyPath(kp) if kp.len() == 1 => component
                .perform(kp.first())
                .map_err(|e| e.in_binding(&self.name)),
            BindingSource::KeyPath(kp) => Err(TrellisError::evaluation(format!(
                "action key path \"{kp}\" must be a single key"
            ))
            .in_binding(&self.name)),
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            BindingSource::Constant(v) => write!(f, "{v}"),
            BindingSource::KeyPath(kp) => write!(f, "${kp}"),
        }
    }
}

/// The binding table of one element, consumed by the element constructor.
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: BTreeMap<String, Binding>,
}

impl BindingSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding in template notation (see [`Binding::parse`]).
    pub fn with(mut self, name: &str, raw: impl Into<Value>) -> TrellisResult<Self> {
        self.insert(Binding::parse(name, raw.into())?);
        Ok(self)
    }

    /// Add an already-built binding, replacing any binding of the same name.
    pub fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.name().to_owned(), binding);
    }

    /// Remove and return an optional binding.
    pub fn take(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    /// Remove and return a binding the element cannot work without.
    pub fn required(&mut self, element: &str, name: &str) -> TrellisResult<Binding> {
        self.take(name)
            .ok_or_else(|| TrellisError::missing_binding(element, name))
    }

    /// Bindings not claimed by the element, in name order.
    pub fn into_remaining(self) -> Vec<Binding> {
        self.bindings.into_values().collect()
    }

    /// Names present in the set.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// `true` if no bindings remain.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<Binding> for BindingSet {
    fn from_iter<I: IntoIterator<Item = Binding>>(iter: I) -> Self {
        let mut set = Self::new();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

#[cfg(test)]
#[path = "../../tests/unit/binding/bind.rs"]
mod tests;
