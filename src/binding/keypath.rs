use crate::component::api::Component;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::value::{Value, type_name};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A parsed dotted key path (`user.address.city`, `rows.0.label`).
///
/// The first segment is resolved through the component; the rest descend into the resulting
/// value. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    source: Arc<str>,
    segments: SmallVec<[Arc<str>; 4]>,
}

impl KeyPath {
    /// Parse a dotted key path.
    pub fn parse(src: &str) -> TrellisResult<Self> {
        let src = src.trim();
        if src.is_empty() {
            return Err(TrellisError::configuration("empty key path"));
        }
        let mut segments = SmallVec::new();
        for seg in src.split('.') {
            if seg.is_empty() || seg.chars().any(char::is_whitespace) {
                return Err(TrellisError::configuration(format!(
                    "malformed key path \"{src}\""
                )));
            }
            segments.push(Arc::from(seg));
        }
        Ok(Self {
            source: Arc::from(src),
            segments,
        })
    }

    /// Original dotted form.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The key resolved through the component.
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`: parsing rejects empty paths.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Evaluate against `component`.
    pub fn value(&self, component: &dyn Component) -> TrellisResult<Value> {
        let mut cur = component.value_for_key(self.first())?;
        for seg in &self.segments[1..] {
            cur = match descend(&cur, seg) {
                Some(v) => v,
                None if cur.is_null() => return Ok(Value::Null),
                None => {
                    return Err(TrellisError::evaluation(format!(
                        "cannot resolve '{seg}' of {} in \"{}\"",
                        type_name(&cur),
                        self.source
                    )));
                }
            };
        }
        Ok(cur)
    }

    /// Write `value` through the path.
    ///
    /// Multi-segment paths read the root value, replace the nested slot and store the root back.
    pub fn set_value(&self, value: Value, component: &mut dyn Component) -> TrellisResult<()> {
        if self.segments.len() == 1 {
            return component.take_value_for_key(self.first(), value);
        }

        let mut root = component.value_for_key(self.first())?;
        let (last, middle) = self.segments[1..]
            .split_last()
            .ok_or_else(|| TrellisError::evaluation("key path has no tail"))?;

        let mut slot = &mut root;
        for seg in middle {
            slot = descend_mut(slot, seg).ok_or_else(|| {
                TrellisError::evaluation(format!(
                    "cannot set through '{seg}' in \"{}\"",
                    self.source
                ))
            })?;
        }
        match slot {
            Value::Object(map) => {
                map.insert(last.to_string(), value);
            }
            Value::Array(items) => {
                let idx = index_of(last, items.len()).ok_or_else(|| {
                    TrellisError::evaluation(format!(
                        "index '{last}' out of range in \"{}\"",
                        self.source
                    ))
                })?;
                items[idx] = value;
            }
            other => {
                return Err(TrellisError::evaluation(format!(
                    "cannot set '{last}' on {} in \"{}\"",
                    type_name(other),
                    self.source
                )));
            }
        }
        component.take_value_for_key(self.first(), root)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn descend(v: &Value, seg: &str) -> Option<Value> {
    match v {
        Value::Object(map) => match map.get(seg) {
            Some(child) => Some(child.clone()),
            None if seg == "count" => Some(Value::from(map.len())),
            None => Some(Value::Null),
        },
        Value::Array(items) => {
            if seg == "count" {
                return Some(Value::from(items.len()));
            }
            let idx = seg.parse::<usize>().ok()?;
            Some(items.get(idx).cloned().unwrap_or(Value::Null))
        }
        _ => None,
    }
}

fn descend_mut<'a>(v: &'a mut Value, seg: &str) -> Option<&'a mut Value> {
    match v {
        Value::Object(map) => map.get_mut(seg).filter(|c| !c.is_null()),
        Value::Array(items) => {
            let idx = index_of(seg, items.len())?;
            items.get_mut(idx)
        }
        _ => None,
    }
}

fn index_of(seg: &str, len: usize) -> Option<usize> {
    seg.parse::<usize>().ok().filter(|&i| i < len)
}

#[cfg(test)]
#[path = "../../tests/unit/binding/keypath.rs"]
mod tests;
