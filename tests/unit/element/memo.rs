use super::*;
use crate::component::dynamic::DynamicComponent;
use crate::component::registry::ComponentRegistry;
use crate::context::request::Request;
use crate::context::request_context::{CycleOpts, Phase};
use crate::cycle::application::AppResources;
use crate::element::container::Template;
use crate::element::dynamic::{ActionElement, StringElement};
use crate::element::repetition::Repetition;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

fn memo() -> Element {
    let mut content = Template::new();
    content.add(Element::text("["));
    content.add(Element::Str(
        StringElement::new(BindingSet::new().with("value", "$label").unwrap()).unwrap(),
    ));
    content.add(Element::text("]"));
    let bindings = BindingSet::new().with("key", "$version").unwrap();
    Element::Memoized(MemoizedFragment::new(bindings, Element::Template(content)).unwrap())
}

fn page(memo: Element) -> Element {
    let mut t = Template::new();
    t.add(memo);
    t.add(Element::Action(
        ActionElement::new(BindingSet::new().with("action", "Next").unwrap(), None).unwrap(),
    ));
    Element::Template(t)
}

fn render(resources: &Arc<AppResources>, e: &Element, c: &mut DynamicComponent) -> String {
    let mut ctx = RequestContext::new(Arc::clone(resources), &Request::new(), CycleOpts::default());
    ctx.begin_phase(Phase::RenderResponse);
    e.render_response(&mut ctx, c).unwrap();
    ctx.take_content()
}

#[test]
fn output_is_cached_per_key() {
    let resources = Arc::new(AppResources::new(ComponentRegistry::new()));
    let e = page(memo());
    let mut c = DynamicComponent::new(
        "Main",
        json!({"version": 1, "label": "one"}).as_object().unwrap().clone(),
    );

    assert_eq!(render(&resources, &e, &mut c), "[one]<a href=\"?sender=2\"></a>");
    c.take_value_for_key("label", json!("changed")).unwrap();
    // same key: cached content, sibling ids unchanged
    assert_eq!(render(&resources, &e, &mut c), "[one]<a href=\"?sender=2\"></a>");
    c.take_value_for_key("version", json!(2)).unwrap();
    assert_eq!(render(&resources, &e, &mut c), "[changed]<a href=\"?sender=2\"></a>");

    let stats = resources.fragment_cache().stats();
    assert_eq!((stats.hits, stats.misses), (1, 2));
    assert_eq!(resources.fragment_cache().len(), 2);
}

#[test]
fn hits_never_replay_ids_from_another_position() {
    let resources = Arc::new(AppResources::new(ComponentRegistry::new()));
    let action = Element::Action(
        ActionElement::new(BindingSet::new().with("action", "$pick").unwrap(), None).unwrap(),
    );
    let memo = MemoizedFragment::new(BindingSet::new().with("key", "static").unwrap(), action)
        .unwrap();
    let rows = Repetition::new(
        BindingSet::new()
            .with("list", "$items")
            .and_then(|b| b.with("key", "$k"))
            .unwrap(),
        Element::Memoized(memo),
    )
    .unwrap();
    let e = Element::Repetition(rows);
    let mut c = DynamicComponent::new(
        "Main",
        json!({"items": ["a", "b"]}).as_object().unwrap().clone(),
    );

    let expected = "<a href=\"?sender=1.1.1.1\"></a><a href=\"?sender=1.2.1.1\"></a>";
    assert_eq!(render(&resources, &e, &mut c), expected);
    // second request: both rows hit, each at its own position
    assert_eq!(render(&resources, &e, &mut c), expected);
    let stats = resources.fragment_cache().stats();
    assert_eq!((stats.hits, stats.misses), (2, 2));
}

#[test]
fn failed_render_caches_nothing() {
    let cache = FragmentCache::new();
    let err = cache
        .get_or_try_insert_with(7, || Err(TrellisError::evaluation("boom")))
        .unwrap_err();
    assert!(matches!(err, TrellisError::Evaluation(_)));
    assert!(cache.is_empty());
    let v = cache.get_or_try_insert_with(7, || Ok("ok".to_owned())).unwrap();
    assert_eq!(&*v, "ok");
}

#[test]
fn first_writer_wins_under_contention() {
    let cache = FragmentCache::new();
    let renders = AtomicUsize::new(0);
    let results: Vec<Arc<str>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = &cache;
                let renders = &renders;
                s.spawn(move || {
                    cache
                        .get_or_try_insert_with(42, || {
                            renders.fetch_add(1, Ordering::SeqCst);
                            Ok(format!("render-{i}"))
                        })
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(cache.get(42).as_deref(), Some(&*results[0]));
    let stats = cache.stats();
    assert_eq!(stats.hits + stats.misses, 8);
    assert_eq!(stats.misses as usize, renders.load(Ordering::SeqCst));
    assert_eq!(stats.lost_races + 1, stats.misses);
}
