//! Dynamic values flowing through bindings.
//!
//! Component state is modelled as JSON values; the coercions below define how a resolved value
//! is viewed as text or as a flag.

/// Dynamic value type resolved by bindings and stored by components.
pub type Value = serde_json::Value;

/// Text view of a value. `null` is the empty string; strings are returned verbatim; every other
/// value uses its compact JSON form.
pub fn string_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Flag view of a value. `null`, `false`, zero, `""`, `"false"`, `"no"` and `"0"` are false;
/// empty collections are false.
pub fn bool_value(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.trim(), "" | "false" | "no" | "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Short type name used in evaluation error messages.
pub(crate) fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/value.rs"]
mod tests;
