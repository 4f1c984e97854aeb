use super::*;
use crate::component::dynamic::DynamicComponent;
use serde_json::{Map, json};

fn component() -> DynamicComponent {
    DynamicComponent::new(
        "Main",
        json!({"name": "World", "flag": "no"}).as_object().unwrap().clone(),
    )
}

#[test]
fn template_notation() {
    assert!(Binding::parse("v", json!("$name")).unwrap().is_settable());
    let lit = Binding::parse("v", json!("$$5")).unwrap();
    assert_eq!(lit.source(), &BindingSource::Constant(json!("$5")));
    assert!(Binding::parse("v", json!(3)).unwrap().is_constant());
    assert!(Binding::parse("v", json!("$")).is_err());
}

#[test]
fn constant_ignores_component() {
    let b = Binding::constant("value", "fixed");
    let c = component();
    assert_eq!(b.value(&c).unwrap(), json!("fixed"));
    let empty = DynamicComponent::new("Other", Map::new());
    assert_eq!(b.value(&empty).unwrap(), json!("fixed"));
}

#[test]
fn settable_binding_round_trips() {
    let b = Binding::key_path("value", "name").unwrap();
    let mut c = component();
    b.set_value(json!("Trellis"), &mut c).unwrap();
    assert_eq!(b.value(&c).unwrap(), json!("Trellis"));
}

#[test]
fn constant_refuses_writes() {
    let b = Binding::constant("value", "fixed");
    let mut c = component();
    let err = b.set_value(json!("x"), &mut c).unwrap_err();
    assert!(matches!(err, TrellisError::NotSettable { ref binding } if binding == "value"));
    assert_eq!(c.value_for_key("value").unwrap(), Value::Null);
}

#[test]
fn typed_views_default_absent_values() {
    let c = component();
    let missing = Binding::key_path("value", "missing").unwrap();
    assert_eq!(missing.string_value(&c).unwrap(), "");
    assert!(!missing.bool_value(&c).unwrap());
    assert!(!Binding::key_path("c", "flag").unwrap().bool_value(&c).unwrap());
}

#[test]
fn evaluation_errors_name_the_binding() {
    let c = component();
    let err = Binding::key_path("label", "name.first")
        .unwrap()
        .value(&c)
        .unwrap_err();
    assert!(err.to_string().starts_with("binding 'label':"), "{err}");
}

#[test]
fn action_bindings() {
    let mut c = component();
    assert_eq!(
        Binding::constant("action", "Next").invoke(&mut c).unwrap(),
        ActionResult::Goto("Next".to_string())
    );
    assert_eq!(
        Binding::constant("action", Value::Null).invoke(&mut c).unwrap(),
        ActionResult::Stay
    );
    assert!(Binding::key_path("action", "a.b").unwrap().invoke(&mut c).is_err());
}

#[test]
fn required_binding_missing_is_fatal() {
    let mut set = BindingSet::new().with("value", "$name").unwrap();
    assert!(set.required("TextField", "value").is_ok());
    let err = set.required("TextField", "value").unwrap_err();
    assert!(err.is_fatal());
    assert!(set.is_empty());
}

#[test]
fn bindings_are_shareable_across_threads() {
    let b = std::sync::Arc::new(Binding::key_path("value", "n").unwrap());
    std::thread::scope(|s| {
        for i in 0..4 {
            let b = std::sync::Arc::clone(&b);
            s.spawn(move || {
                let c = DynamicComponent::new(
                    "T",
                    json!({"n": i}).as_object().unwrap().clone(),
                );
                assert_eq!(b.value(&c).unwrap(), json!(i));
            });
        }
    });
}
