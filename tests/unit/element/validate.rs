use super::*;

#[test]
fn diagnostics_carry_component_and_location() {
    let mut vctx = ValidationContext::new("Main", None);
    vctx.warning("loose");
    vctx.set_location(Some(TemplateLocation::new("Main", 4)));
    vctx.error("broken");
    let diags = vctx.into_diagnostics();
    assert_eq!(diags[0].to_string(), "warning: Main: loose");
    assert_eq!(diags[1].to_string(), "error: Main (Main:4): broken");
}

#[test]
fn report_counts_errors_across_components() {
    let mut report = ValidationReport::default();
    report.insert("Empty".to_owned(), Vec::new());
    assert!(report.is_empty());

    let mut a = ValidationContext::new("A", None);
    a.warning("w");
    let mut b = ValidationContext::new("B", None);
    b.error("e1");
    b.error("e2");
    report.insert("A".to_owned(), a.into_diagnostics());
    report.insert("B".to_owned(), b.into_diagnostics());

    assert_eq!(report.iter().count(), 3);
    assert_eq!(report.error_count(), 2);
    assert!(report.has_errors());
    assert!(!report.by_component.contains_key("Empty"));
}
