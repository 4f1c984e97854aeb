use super::*;
use crate::element::node::ElementVisitor;
use serde_json::json;

fn build(v: serde_json::Value) -> TrellisResult<Element> {
    let def: NodeDef = serde_json::from_value(v).unwrap();
    TemplateBuilder::new("Main").build(&def)
}

struct Kinds(Vec<&'static str>);

impl ElementVisitor for Kinds {
    fn visit(&mut self, element: &Element, _depth: usize) {
        self.0.push(element.kind());
    }
}

fn kinds(e: &Element) -> Vec<&'static str> {
    let mut k = Kinds(Vec::new());
    e.walk(&mut k);
    k.0
}

#[test]
fn strings_and_arrays_map_to_text_and_templates() {
    let e = build(json!(["Hello, ", "there", {"type": "string", "bindings": {"value": "$name"}}]))
        .unwrap();
    assert_eq!(kinds(&e), ["Template", "Text", "String"]);
}

#[test]
fn every_element_kind_builds() {
    let e = build(json!([
        {"type": "tag", "name": "ul", "content": {
            "type": "repetition",
            "bindings": {"list": "$items", "key": "$k"},
            "content": {
                "type": "tag",
                "name": "li",
                "content": {"type": "string", "bindings": {"value": "$k"}}
            }
        }},
        {"type": "textfield", "bindings": {"value": "$name"}},
        {"type": "action", "bindings": {"action": "$save"}, "content": "Save"},
        {"type": "if", "bindings": {"condition": "$flag"}, "content": "on", "else": "off"},
        {"type": "component", "name": "Child", "bindings": {"title": "$name"}},
        {"type": "memo", "bindings": {"key": "$v"}, "content": "static"},
        {"type": "container", "content": ["a", "b"]}
    ]))
    .unwrap();
    assert_eq!(
        kinds(&e),
        [
            "Template",
            "Tag",
            "Repetition",
            "Tag",
            "String",
            "TextField",
            "Action",
            "Text",
            "Conditional",
            "Text",
            "Text",
            "ComponentReference",
            "Memoized",
            "Text",
            "Container",
            "Template",
            "Text",
        ]
    );
}

#[test]
fn lines_become_locations() {
    let e = build(json!({"type": "string", "bindings": {"value": 1}, "line": 12})).unwrap();
    assert_eq!(e.location().map(ToString::to_string).as_deref(), Some("Main:12"));
}

#[test]
fn structural_errors_are_configuration_errors() {
    let no_name = build(json!({"type": "component"})).unwrap_err();
    assert!(matches!(no_name, TrellisError::Configuration(_)));
    let no_content = build(json!({"type": "if", "bindings": {"condition": true}})).unwrap_err();
    assert!(no_content.is_fatal());
    let missing = build(json!({"type": "textfield"})).unwrap_err();
    assert!(matches!(missing, TrellisError::MissingBinding { .. }));
}

#[test]
fn unknown_fields_fail_to_parse() {
    let err = TemplateBuilder::new("Main")
        .build_json(r#"{"type": "string", "bindngs": {}}"#)
        .unwrap_err();
    assert!(matches!(err, TrellisError::Serde(_)));
}
