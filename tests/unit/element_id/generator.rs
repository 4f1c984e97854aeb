use super::*;

fn ids(g: &ElementIdGenerator) -> String {
    g.current_element_id_path().to_string()
}

#[test]
fn reset_seeds_single_zero_counter() {
    let mut g = ElementIdGenerator::new();
    g.next_element_id().unwrap();
    g.push_level().unwrap();
    g.reset();
    assert_eq!(g.depth(), 1);
    assert_eq!(g.levels(), &[0]);
}

#[test]
fn ids_increase_depth_first_left_to_right() {
    let mut g = ElementIdGenerator::new();
    let a = g.next_element_id().unwrap();
    g.push_level().unwrap();
    let b = g.next_element_id().unwrap();
    let c = g.next_element_id().unwrap();
    g.pop_level();
    let d = g.next_element_id().unwrap();

    assert_eq!(a.to_string(), "1");
    assert_eq!(b.to_string(), "2.1");
    assert_eq!(c.to_string(), "2.2");
    assert_eq!(d.to_string(), "3");
    assert!(a < b && b < c && c < d);
}

#[test]
fn two_level_push_reserves_sub_index() {
    let mut g = ElementIdGenerator::new();
    g.push_level_n(4).unwrap();
    assert_eq!(ids(&g), "1.4.0");
    let inner = g.next_element_id().unwrap();
    assert_eq!(inner.to_string(), "1.4.1");
    g.pop_level_n();
    assert_eq!(g.depth(), 1);
    assert_eq!(g.next_element_id().unwrap().to_string(), "2");
}

#[test]
fn next_prefix_matches_tracks_the_next_slot() {
    let mut g = ElementIdGenerator::new();
    g.next_element_id().unwrap(); // "1"
    let target: ElementIdPath = "2.3".parse().unwrap();
    assert!(g.next_prefix_matches(&target));
    assert!(g.next_prefix_matches(&"2".parse().unwrap()));
    assert!(!g.next_prefix_matches(&"3.1".parse().unwrap()));
    assert!(!g.next_prefix_matches(&"1.1".parse().unwrap()));

    g.push_level().unwrap(); // scope "2"
    assert!(g.next_prefix_matches(&"2.1.4".parse().unwrap()));
    assert!(!g.next_prefix_matches(&target));
}

#[test]
fn has_passed_is_strictly_before_next_id() {
    let mut g = ElementIdGenerator::new();
    g.push_level().unwrap(); // inside scope "1"
    g.next_element_id().unwrap(); // "1.1"

    assert!(g.has_passed(&"1".parse().unwrap()));
    assert!(g.has_passed(&"1.1".parse().unwrap()));
    assert!(g.has_passed(&"1.1.9".parse().unwrap()));
    assert!(!g.has_passed(&"1.2".parse().unwrap()));
    assert!(!g.has_passed(&"1.2.1".parse().unwrap()));
    assert!(!g.has_passed(&"2".parse().unwrap()));
}

#[test]
fn counter_overflow_is_fatal() {
    let mut g = ElementIdGenerator::new();
    g.push_level().unwrap();
    for _ in 0..MAX_LEVEL_COUNTER {
        g.next_element_id().unwrap();
    }
    let err = g.next_element_id().unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        TrellisError::ElementIdOverflow { ref path, max } if path == "1" && max == u16::MAX
    ));
    assert!(g.skip_level().is_err());
}
