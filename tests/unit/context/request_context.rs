use super::*;

fn context(request: &Request, allows_skipping: bool) -> RequestContext {
    RequestContext::new(
        Arc::new(AppResources::new(ComponentRegistry::new())),
        request,
        CycleOpts {
            allows_skipping,
            ..CycleOpts::default()
        },
    )
}

#[test]
fn unparsable_ids_are_dropped() {
    let req = Request::new()
        .with_sender_id("1.x")
        .with_form_value("2.1", "a")
        .with_form_value("bogus", "b");
    let mut ctx = context(&req, false);
    assert!(ctx.request_sender_id().is_none());
    assert_eq!(ctx.target_form_id_path().map(|p| p.to_string()).as_deref(), Some("2.1"));
}

#[test]
fn scopes_are_entered_when_skipping_is_off() {
    let mut ctx = context(&Request::new(), false);
    ctx.begin_phase(Phase::ApplyValues);
    let r = ctx.run_scoped(|ctx| Ok(ctx.scope_element_id_path().to_string())).unwrap();
    assert_eq!(r.as_deref(), Some("1"));
    assert_eq!(ctx.stats().scopes_skipped, 0);
}

#[test]
fn apply_skips_scopes_without_the_target() {
    let mut ctx = context(&Request::new().with_form_value("2.1", "v"), true);
    ctx.begin_phase(Phase::ApplyValues);

    let first = ctx.run_scoped(|_| Ok(())).unwrap();
    assert_eq!(first, None);
    let second = ctx
        .run_scoped(|ctx| {
            let id = ctx.next_element_id()?;
            Ok(ctx.take_form_value(&id))
        })
        .unwrap();
    assert_eq!(second, Some(Some("v".to_owned())));
    assert!(ctx.apply_exhausted());
    assert_eq!(ctx.stats().scopes_skipped, 1);
}

#[test]
fn passed_targets_are_pruned() {
    let mut ctx = context(
        &Request::new()
            .with_form_value("1.5", "stale")
            .with_form_value("3", "live"),
        true,
    );
    ctx.begin_phase(Phase::ApplyValues);
    ctx.next_element_id().unwrap();
    ctx.next_element_id().unwrap();
    // "1.5" can no longer be minted once the generator is at "2"
    assert_eq!(ctx.target_form_id_path().map(|p| p.to_string()).as_deref(), Some("3"));
}

#[test]
fn invoke_skips_everything_without_a_sender() {
    let mut ctx = context(&Request::new(), true);
    ctx.begin_phase(Phase::InvokeAction);
    assert_eq!(ctx.run_scoped(|_| Ok(())).unwrap(), None);

    let mut ctx = context(&Request::new().with_sender_id("2"), true);
    ctx.begin_phase(Phase::InvokeAction);
    assert_eq!(ctx.run_scoped(|_| Ok(1)).unwrap(), None);
    let fired = ctx
        .run_scoped(|ctx| Ok(ctx.is_sender(&ctx.scope_element_id_path())))
        .unwrap();
    assert_eq!(fired, Some(true));
}

#[test]
fn render_never_skips() {
    let mut ctx = context(&Request::new(), true);
    ctx.begin_phase(Phase::RenderResponse);
    assert_eq!(ctx.run_scoped(|_| Ok(())).unwrap(), Some(()));
}

#[test]
fn levels_are_popped_on_error() {
    let mut ctx = context(&Request::new(), false);
    ctx.begin_phase(Phase::RenderResponse);
    let err = ctx
        .with_element_id_level(|ctx| {
            ctx.push_element_id_level_n(3)?;
            ctx.pop_element_id_level_n();
            Err::<(), _>(TrellisError::evaluation("boom"))
        })
        .unwrap_err();
    assert!(matches!(err, TrellisError::Evaluation(_)));
    assert_eq!(ctx.element_id_depth(), 1);
    assert_eq!(ctx.next_element_id().unwrap().to_string(), "2");
}

#[test]
fn two_level_scopes_reserve_a_sub_index() {
    let mut ctx = context(&Request::new(), false);
    ctx.begin_phase(Phase::RenderResponse);
    let id = ctx
        .run_scoped_n(2, |ctx| ctx.next_element_id())
        .unwrap()
        .map(|p| p.to_string());
    assert_eq!(id.as_deref(), Some("1.2.1"));
    assert_eq!(ctx.element_id_depth(), 1);
}

#[test]
fn locate_keeps_the_innermost_position() {
    let mut ctx = context(&Request::new(), false);
    ctx.begin_phase(Phase::RenderResponse);
    ctx.enter_component("Main");
    ctx.enter_component("Child");
    ctx.next_element_id().unwrap();
    let inner = ctx.locate(TrellisError::evaluation("x"), None);
    ctx.leave_component();
    let outer = ctx.locate(inner, Some(&TemplateLocation::new("Main", 9)));
    assert_eq!(outer.to_string(), "evaluation error: x [component Main/Child, element 1]");
}

#[test]
fn capture_isolates_output() {
    let mut ctx = context(&Request::new(), false);
    ctx.response().append_content("outer;");
    let inner = ctx
        .capture(|ctx| {
            ctx.response().append_content("inner");
            Ok(())
        })
        .unwrap();
    assert_eq!(inner, "inner");
    assert_eq!(ctx.take_content(), "outer;");
}

#[test]
fn labels_are_recorded_only_in_record_mode() {
    let id = ElementIdPath::new(&[1]);
    let mut quiet = context(&Request::new(), false);
    quiet.record_label(&id, "x");
    assert!(quiet.recorded().is_empty());

    let mut ctx = RequestContext::new(
        Arc::new(AppResources::new(ComponentRegistry::new())),
        &Request::new(),
        CycleOpts {
            debug: DebugFlags {
                record_playback: true,
                ..DebugFlags::default()
            },
            ..CycleOpts::default()
        },
    );
    ctx.push_semantic_prefix("row".to_owned());
    ctx.record_label(&id, "name");
    ctx.pop_semantic_prefix();
    ctx.record_label(&id, "save");
    let labels: Vec<_> = ctx.recorded().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, ["row.name", "save"]);
}

#[test]
fn submitted_ids_are_not_interned() {
    let resources = Arc::new(AppResources::new(ComponentRegistry::new()));
    for i in 0..50 {
        let req = Request::new()
            .with_sender_id(format!("8.{i}"))
            .with_form_value(format!("9.{i}.7"), "x");
        let mut ctx = RequestContext::new(Arc::clone(&resources), &req, CycleOpts::default());
        assert_eq!(ctx.request_sender_id().map(|p| p.to_string()), Some(format!("8.{i}")));
        assert!(ctx.is_sender(&ElementIdPath::new(&[8, i])));
        assert!(ctx.target_form_id_path().is_some());
    }
    assert!(resources.path_table().is_empty());
}
