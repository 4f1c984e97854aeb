use super::*;
use crate::binding::bind::BindingSet;
use crate::component::dynamic::DynamicComponent;
use crate::component::registry::ComponentRegistry;
use crate::context::request::Request;
use crate::context::request_context::{CycleOpts, DebugFlags, Phase};
use crate::cycle::application::AppResources;
use crate::element::container::Template;
use crate::element::dynamic::{StringElement, TagElement};
use crate::foundation::error::TrellisError;
use serde_json::{Map, json};

fn located(element: Element, line: u32) -> Element {
    element.with_location(TemplateLocation::new("Main", line))
}

fn tree() -> Element {
    let name = StringElement::new(BindingSet::new().with("value", "$name").unwrap()).unwrap();
    let mut inner = Template::new();
    inner.add(Element::text("Hi "));
    inner.add(located(Element::Str(name), 3));
    let tag = TagElement::new("p", BindingSet::new(), Some(Element::Template(inner))).unwrap();
    let mut root = Template::new();
    root.add(located(Element::Tag(tag), 2));
    root.add(Element::text("\n"));
    located(Element::Template(root), 1)
}

struct Collect(Vec<(usize, &'static str)>);

impl ElementVisitor for Collect {
    fn visit(&mut self, element: &Element, depth: usize) {
        self.0.push((depth, element.kind()));
    }
}

#[test]
fn walk_is_pre_order_with_depths() {
    let mut v = Collect(Vec::new());
    tree().walk(&mut v);
    assert_eq!(
        v.0,
        [
            (0, "Template"),
            (1, "Tag"),
            (2, "Template"),
            (3, "Text"),
            (3, "String"),
            (1, "Text"),
        ]
    );
}

#[test]
fn debug_description_names_variant_and_location() {
    let t = tree();
    let d = t.debug_description();
    assert_eq!(d["kind"], "Template");
    assert_eq!(d["location"], "Main:1");
    assert_eq!(d["children"], "2");

    let tag = t.children()[0];
    assert_eq!(tag.debug_description()["name"], "p");
    assert_eq!(Element::text("x").location(), None);
}

#[derive(Debug)]
struct Failing;

impl Cycleable for Failing {
    fn render_response(
        &self,
        _ctx: &mut RequestContext,
        _component: &mut dyn Component,
    ) -> TrellisResult<()> {
        Err(TrellisError::evaluation("boom"))
    }
}

#[test]
fn tracked_template_stack_locates_custom_failures() {
    let mut root = Template::new();
    root.add(Element::custom(Failing));
    let tree = located(Element::Template(root), 7);

    let resources = Arc::new(AppResources::new(ComponentRegistry::new()));
    let opts = CycleOpts {
        debug: DebugFlags {
            track_template_stack: true,
            ..DebugFlags::default()
        },
        ..CycleOpts::default()
    };
    let mut ctx = RequestContext::new(resources, &Request::new(), opts);
    ctx.begin_phase(Phase::RenderResponse);
    let mut c = DynamicComponent::new("Main", Map::new());

    let err = tree.render_response(&mut ctx, &mut c).unwrap_err();
    let TrellisError::Located { location, .. } = &err else {
        panic!("expected located error, got {err}");
    };
    assert_eq!(location.as_ref().map(ToString::to_string).as_deref(), Some("Main:7"));
    assert!(ctx.current_template_location().is_none());
}

#[test]
fn visits_are_counted_per_phase() {
    let resources = Arc::new(AppResources::new(ComponentRegistry::new()));
    let mut ctx = RequestContext::new(resources, &Request::new(), CycleOpts::default());
    ctx.begin_phase(Phase::RenderResponse);
    let mut c = DynamicComponent::new("Main", json!({"name": "Ada"}).as_object().unwrap().clone());
    tree().render_response(&mut ctx, &mut c).unwrap();
    assert_eq!(ctx.take_content(), "<p>Hi Ada</p>\n");
    assert_eq!(ctx.stats().visited_render, 6);
    assert_eq!(ctx.stats().visited_apply, 0);
}
