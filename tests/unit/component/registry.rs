use super::*;
use crate::component::dynamic::DynamicComponent;
use crate::element::builder::TemplateBuilder;
use crate::element::validate::Severity;
use serde_json::{Map, json};

fn definition(name: &'static str, template: serde_json::Value) -> ComponentDefinition {
    let def = serde_json::from_value(template).unwrap();
    let element = TemplateBuilder::new(name).build(&def).unwrap();
    ComponentDefinition::new(name, element, move || {
        Box::new(DynamicComponent::new(name, Map::new())) as Box<dyn Component>
    })
}

#[test]
fn names_are_unique() {
    let mut r = ComponentRegistry::new();
    r.register(definition("Main", json!("x"))).unwrap();
    let err = r.register(definition("Main", json!("y"))).unwrap_err();
    assert!(matches!(err, TrellisError::Configuration(_)));
    assert_eq!(r.len(), 1);
    assert!(r.definition("Nope").is_err());
}

#[test]
fn definitions_instantiate_fresh_state() {
    let r = ComponentRegistry::new()
        .with(definition("Main", json!("x")))
        .unwrap();
    let def = r.definition("Main").unwrap();
    let mut a = def.instantiate();
    a.take_value_for_key("n", json!(1)).unwrap();
    let b = def.instantiate();
    assert_eq!(b.value_for_key("n").unwrap(), json!(null));
    assert_eq!(b.name(), "Main");
}

#[test]
fn validate_all_reports_reference_problems() {
    let child = definition("Child", json!({"type": "string", "bindings": {"value": "$title"}}))
        .with_api(["title", "subtitle"])
        .with_required(["title"]);
    let main = definition(
        "Main",
        json!([
            {"type": "component", "name": "Child", "bindings": {"colour": "red"}, "line": 2},
            {"type": "component", "name": "Ghost", "line": 3},
            {"type": "textfield", "bindings": {"value": "fixed"}, "line": 4}
        ]),
    );
    let ok = definition(
        "Ok",
        json!({"type": "component", "name": "Child", "bindings": {"title": "$t"}}),
    );
    let r = ComponentRegistry::new()
        .with(child)
        .unwrap()
        .with(main)
        .unwrap()
        .with(ok)
        .unwrap();

    let report = r.validate_all();
    assert_eq!(report.by_component.keys().collect::<Vec<_>>(), ["Main"]);
    let messages: Vec<_> = report.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "unknown binding 'colour' for component 'Child'",
            "missing required binding 'title' for component 'Child'",
            "unknown component 'Ghost'",
            "TextField: 'value' must be a settable key path",
        ]
    );
    assert!(report.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(report.iter().next().and_then(|d| d.location.as_deref()), Some("Main:2"));
}
