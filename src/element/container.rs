use crate::component::api::{ActionResult, Component};
use crate::context::request_context::RequestContext;
use crate::element::node::{Cycleable, DebugDescription, Element};
use crate::foundation::error::TrellisResult;
use crate::foundation::location::TemplateLocation;

/// Ordered sequence of sibling elements.
///
/// Adjacent literal text is merged on [`add`](Self::add); rendering is identical either way.
#[derive(Debug, Default)]
pub struct Template {
    children: Vec<Element>,
    pub(crate) location: Option<TemplateLocation>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element`, merging it into the previous child when both are literal text.
    pub fn add(&mut self, element: Element) {
        if let Element::Text(next) = &element {
            if next.text.is_empty() {
                return;
            }
            if let Some(Element::Text(last)) = self.children.last_mut() {
                last.text.push_str(&next.text);
                return;
            }
        }
        self.children.push(element);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl FromIterator<Element> for Template {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut t = Self::new();
        for e in iter {
            t.add(e);
        }
        t
    }
}

impl Cycleable for Template {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        for (i, child) in self.children.iter().enumerate() {
            if ctx.apply_exhausted() {
                ctx.note_siblings_skipped(self.children.len() - i);
                break;
            }
            child
                .apply_values(ctx, component)
                .map_err(|e| ctx.locate(e, child.location()))?;
        }
        Ok(())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        for child in &self.children {
            let result = child
                .invoke_action(ctx, component)
                .map_err(|e| ctx.locate(e, child.location()))?;
            if result.is_some() {
                return Ok(result);
            }
        }
        Ok(None)
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        for child in &self.children {
            child
                .render_response(ctx, component)
                .map_err(|e| ctx.locate(e, child.location()))?;
        }
        Ok(())
    }

    fn debug_description(&self) -> DebugDescription {
        DebugDescription::from([("children", self.children.len().to_string())])
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Single(Box<Element>),
    // Always holds `Element::Template`.
    Promoted(Box<Element>),
}

/// Element with one content slot.
///
/// The first child added becomes the content; a second child promotes the slot to a
/// [`Template`] holding both, and later children are appended to it.
#[derive(Debug, Default)]
pub struct Container {
    slot: Slot,
    pub(crate) location: Option<TemplateLocation>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, element: Element) {
        self.slot = match std::mem::take(&mut self.slot) {
            Slot::Empty => Slot::Single(Box::new(element)),
            Slot::Single(first) => {
                let mut t = Template::new();
                t.add(*first);
                t.add(element);
                Slot::Promoted(Box::new(Element::Template(t)))
            }
            Slot::Promoted(mut content) => {
                if let Element::Template(t) = content.as_mut() {
                    t.add(element);
                }
                Slot::Promoted(content)
            }
        };
    }

    /// Current content: the sole child, the promoted template, or `None` while empty.
    pub fn content_element(&self) -> Option<&Element> {
        match &self.slot {
            Slot::Empty => None,
            Slot::Single(e) | Slot::Promoted(e) => Some(e.as_ref()),
        }
    }

    pub fn is_promoted(&self) -> bool {
        matches!(self.slot, Slot::Promoted(_))
    }
}

impl Cycleable for Container {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        match self.content_element() {
            Some(content) => content
                .apply_values(ctx, component)
                .map_err(|e| ctx.locate(e, content.location())),
            None => Ok(()),
        }
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        match self.content_element() {
            Some(content) => content
                .invoke_action(ctx, component)
                .map_err(|e| ctx.locate(e, content.location())),
            None => Ok(None),
        }
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        match self.content_element() {
            Some(content) => content
                .render_response(ctx, component)
                .map_err(|e| ctx.locate(e, content.location())),
            None => Ok(()),
        }
    }

    fn debug_description(&self) -> DebugDescription {
        let state = match self.slot {
            Slot::Empty => "empty",
            Slot::Single(_) => "single",
            Slot::Promoted(_) => "promoted",
        };
        DebugDescription::from([("slot", state.to_owned())])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/container.rs"]
mod tests;
