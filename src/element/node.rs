use crate::component::api::{ActionResult, Component};
use crate::context::request_context::RequestContext;
use crate::element::container::{Container, Template};
use crate::element::dynamic::{
    ActionElement, ConditionalElement, StringElement, TagElement, TextFieldElement,
};
use crate::element::memo::MemoizedFragment;
use crate::element::reference::ComponentReference;
use crate::element::repetition::Repetition;
use crate::element::validate::ValidationContext;
use crate::foundation::error::TrellisResult;
use crate::foundation::location::TemplateLocation;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name -> value view of an element's configuration, for tooling and diagnostics.
pub type DebugDescription = BTreeMap<&'static str, String>;

/// The three-phase contract every node of the element tree implements.
///
/// Implementations are immutable after construction and shared by concurrent requests; all
/// per-request state lives in the [`RequestContext`] and in the component passed in.
pub trait Cycleable: Send + Sync + std::fmt::Debug {
    /// Consume this element's share of the submitted form values.
    fn apply_values(
        &self,
        _ctx: &mut RequestContext,
        _component: &mut dyn Component,
    ) -> TrellisResult<()> {
        Ok(())
    }

    /// Fire this element's action if it is the sender. `None` means "not me, keep looking".
    fn invoke_action(
        &self,
        _ctx: &mut RequestContext,
        _component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        Ok(None)
    }

    /// Append this element's content to the response.
    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()>;

    /// Record diagnostics about this node only; the caller walks the children.
    fn validate(&self, _vctx: &mut ValidationContext<'_>) {}

    /// Explicit debug view of the node.
    fn debug_description(&self) -> DebugDescription {
        DebugDescription::new()
    }
}

/// Literal text. Adjacent literals are merged when added to a [`Template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextElement {
    pub(crate) text: String,
}

impl TextElement {
    /// Literal content.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Cycleable for TextElement {
    fn render_response(
        &self,
        ctx: &mut RequestContext,
        _component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.response().append_content(&self.text);
        Ok(())
    }

    fn debug_description(&self) -> DebugDescription {
        DebugDescription::from([("text", self.text.clone())])
    }
}

/// A node of the parsed template tree.
#[derive(Debug)]
pub enum Element {
    /// Literal text.
    Text(TextElement),
    /// Escaped output of a bound value.
    Str(StringElement),
    /// Markup tag with bound attributes.
    Tag(TagElement),
    /// Text input whose value is written back in apply-values.
    TextField(TextFieldElement),
    /// Hyperlink firing an action binding.
    Action(ActionElement),
    /// Content shown depending on a condition.
    Conditional(ConditionalElement),
    /// Single content slot, promoted to a template on the second child.
    Container(Container),
    /// Ordered sequence of children.
    Template(Template),
    /// Instantiation of another component.
    ComponentReference(ComponentReference),
    /// Content repeated per entry of a keyed collection.
    Repetition(Repetition),
    /// Content whose rendered output is memoized by key.
    Memoized(MemoizedFragment),
    /// Application-provided element.
    Custom(Arc<dyn Cycleable>),
}

/// Visitor over an element tree (pre-order).
pub trait ElementVisitor {
    /// Called once per node with its depth below the walk root.
    fn visit(&mut self, element: &Element, depth: usize);
}

impl Element {
    /// Literal text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextElement { text: text.into() })
    }

    /// Wrap an application-provided element.
    pub fn custom(element: impl Cycleable + 'static) -> Self {
        Self::Custom(Arc::new(element))
    }

    /// Short variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Str(_) => "String",
            Self::Tag(_) => "Tag",
            Self::TextField(_) => "TextField",
            Self::Action(_) => "Action",
            Self::Conditional(_) => "Conditional",
            Self::Container(_) => "Container",
            Self::Template(_) => "Template",
            Self::ComponentReference(_) => "ComponentReference",
            Self::Repetition(_) => "Repetition",
            Self::Memoized(_) => "Memoized",
            Self::Custom(_) => "Custom",
        }
    }

    /// Template source position, when known.
    pub fn location(&self) -> Option<&TemplateLocation> {
        match self {
            Self::Text(_) | Self::Custom(_) => None,
            Self::Str(e) => e.location.as_ref(),
            Self::Tag(e) => e.location.as_ref(),
            Self::TextField(e) => e.location.as_ref(),
            Self::Action(e) => e.location.as_ref(),
            Self::Conditional(e) => e.location.as_ref(),
            Self::Container(e) => e.location.as_ref(),
            Self::Template(e) => e.location.as_ref(),
            Self::ComponentReference(e) => e.location.as_ref(),
            Self::Repetition(e) => e.location.as_ref(),
            Self::Memoized(e) => e.location.as_ref(),
        }
    }

    /// Attach a template source position.
    pub fn with_location(mut self, location: TemplateLocation) -> Self {
        let slot = match &mut self {
            Self::Text(_) | Self::Custom(_) => return self,
            Self::Str(e) => &mut e.location,
            Self::Tag(e) => &mut e.location,
            Self::TextField(e) => &mut e.location,
            Self::Action(e) => &mut e.location,
            Self::Conditional(e) => &mut e.location,
            Self::Container(e) => &mut e.location,
            Self::Template(e) => &mut e.location,
            Self::ComponentReference(e) => &mut e.location,
            Self::Repetition(e) => &mut e.location,
            Self::Memoized(e) => &mut e.location,
        };
        *slot = Some(location);
        self
    }

    /// Direct children, in traversal order.
    pub fn children(&self) -> Vec<&Element> {
        match self {
            Self::Text(_)
            | Self::Str(_)
            | Self::TextField(_)
            | Self::ComponentReference(_)
            | Self::Custom(_) => Vec::new(),
            Self::Tag(e) => e.content.as_deref().into_iter().collect(),
            Self::Action(e) => e.content.as_deref().into_iter().collect(),
            Self::Conditional(e) => std::iter::once(e.content.as_ref())
                .chain(e.otherwise.as_deref())
                .collect(),
            Self::Container(e) => e.content_element().into_iter().collect(),
            Self::Template(e) => e.children().iter().collect(),
            Self::Repetition(e) => vec![e.content.as_ref()],
            Self::Memoized(e) => vec![e.content.as_ref()],
        }
    }

    /// Pre-order walk over this subtree.
    pub fn walk(&self, visitor: &mut dyn ElementVisitor) {
        self.walk_at(visitor, 0);
    }

    fn walk_at(&self, visitor: &mut dyn ElementVisitor, depth: usize) {
        visitor.visit(self, depth);
        for child in self.children() {
            child.walk_at(visitor, depth + 1);
        }
    }

    /// Validation pass: visit every node of the subtree once.
    pub fn validate(&self, vctx: &mut ValidationContext<'_>) {
        self.walk(&mut ValidateVisitor { vctx });
    }

    /// Debug view including the variant name and source position.
    pub fn debug_description(&self) -> DebugDescription {
        let mut d = self.inner().debug_description();
        d.insert("kind", self.kind().to_owned());
        if let Some(loc) = self.location() {
            d.insert("location", loc.to_string());
        }
        d
    }

    fn inner(&self) -> &dyn Cycleable {
        match self {
            Self::Text(e) => e,
            Self::Str(e) => e,
            Self::Tag(e) => e,
            Self::TextField(e) => e,
            Self::Action(e) => e,
            Self::Conditional(e) => e,
            Self::Container(e) => e,
            Self::Template(e) => e,
            Self::ComponentReference(e) => e,
            Self::Repetition(e) => e,
            Self::Memoized(e) => e,
            Self::Custom(e) => e.as_ref(),
        }
    }

    fn tracked<T>(
        &self,
        ctx: &mut RequestContext,
        f: impl FnOnce(&dyn Cycleable, &mut RequestContext) -> TrellisResult<T>,
    ) -> TrellisResult<T> {
        ctx.note_visit();
        let location = self
            .location()
            .filter(|_| ctx.debug_flags().track_template_stack);
        if let Some(loc) = location {
            ctx.push_template_location(loc);
        }
        let r = f(self.inner(), ctx);
        if location.is_some() {
            ctx.pop_template_location();
        }
        r
    }
}

impl Cycleable for Element {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.tracked(ctx, |e, ctx| e.apply_values(ctx, component))
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        self.tracked(ctx, |e, ctx| e.invoke_action(ctx, component))
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.tracked(ctx, |e, ctx| e.render_response(ctx, component))
    }

    fn validate(&self, vctx: &mut ValidationContext<'_>) {
        Element::validate(self, vctx);
    }

    fn debug_description(&self) -> DebugDescription {
        Element::debug_description(self)
    }
}

struct ValidateVisitor<'v, 'r> {
    vctx: &'v mut ValidationContext<'r>,
}

impl ElementVisitor for ValidateVisitor<'_, '_> {
    fn visit(&mut self, element: &Element, _depth: usize) {
        self.vctx.set_location(element.location().cloned());
        element.inner().validate(self.vctx);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/node.rs"]
mod tests;
