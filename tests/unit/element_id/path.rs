use super::*;
use std::collections::HashMap;

#[test]
fn display_and_parse_agree() {
    let p = ElementIdPath::new(&[1, 3, 2]);
    assert_eq!(p.to_string(), "1.3.2");
    let back: ElementIdPath = "1.3.2".parse().unwrap();
    assert_eq!(back, p);
    assert_eq!(back.content_hash(), p.content_hash());
}

#[test]
fn parse_rejects_garbage() {
    assert!("".parse::<ElementIdPath>().is_err());
    assert!("1..2".parse::<ElementIdPath>().is_err());
    assert!("1.70000".parse::<ElementIdPath>().is_err());
    assert!("a.b".parse::<ElementIdPath>().is_err());
}

#[test]
fn ordering_is_depth_first_preorder() {
    let mut ids: Vec<ElementIdPath> = ["1.2", "1", "2", "1.1.5", "1.10", "1.1"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    ids.sort();
    let s: Vec<String> = ids.iter().map(ToString::to_string).collect();
    assert_eq!(s, ["1", "1.1", "1.1.5", "1.2", "1.10", "2"]);
}

#[test]
fn prefix_relation() {
    let a = ElementIdPath::new(&[1, 2]);
    assert!(a.is_prefix_of(&ElementIdPath::new(&[1, 2, 7])));
    assert!(a.is_prefix_of(&a));
    assert!(!a.is_prefix_of(&ElementIdPath::new(&[1])));
    assert!(!a.is_prefix_of(&ElementIdPath::new(&[1, 3, 2])));
}

#[test]
fn usable_as_map_key() {
    let mut m = HashMap::new();
    m.insert(ElementIdPath::new(&[1, 2]), "field");
    assert_eq!(m.get(&"1.2".parse::<ElementIdPath>().unwrap()), Some(&"field"));
    assert_eq!(m.get(&ElementIdPath::new(&[2, 1])), None);
}
