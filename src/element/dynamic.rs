use crate::binding::bind::{Binding, BindingSet, BindingSource};
use crate::component::api::{ActionResult, Component};
use crate::context::request_context::RequestContext;
use crate::element::node::{Cycleable, DebugDescription, Element};
use crate::element::validate::ValidationContext;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::location::TemplateLocation;
use crate::foundation::value::{self, Value};

fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Leftover bindings of tag-like elements, rendered as extra attributes.
fn extra_attributes(element: &str, bindings: BindingSet) -> TrellisResult<Vec<Binding>> {
    let rest = bindings.into_remaining();
    if let Some(bad) = rest.iter().find(|b| !is_attribute_name(b.name())) {
        return Err(TrellisError::configuration(format!(
            "{element}: '{}' is not a valid attribute name",
            bad.name()
        )));
    }
    Ok(rest)
}

/// Non-tag elements accept no bindings beyond the ones they claim.
fn reject_unknown(element: &str, bindings: BindingSet) -> TrellisResult<()> {
    match bindings.names().next() {
        Some(name) => Err(TrellisError::configuration(format!(
            "{element}: unknown binding '{name}'"
        ))),
        None => Ok(()),
    }
}

fn render_attributes(
    ctx: &mut RequestContext,
    component: &dyn Component,
    attributes: &[Binding],
) -> TrellisResult<()> {
    for attr in attributes {
        let v = attr.value(component)?;
        let out = ctx.response();
        match v {
            Value::Null | Value::Bool(false) => {}
            Value::Bool(true) => {
                out.append_content(" ");
                out.append_content(attr.name());
            }
            other => {
                out.append_content(" ");
                out.append_content(attr.name());
                out.append_content("=\"");
                out.append_escaped(&value::string_value(&other));
                out.append_content("\"");
            }
        }
    }
    Ok(())
}

/// Recording label: the explicit `label` binding, else the text of `fallback`.
fn label_for(
    label: Option<&Binding>,
    fallback: &Binding,
    component: &dyn Component,
) -> TrellisResult<String> {
    match label {
        Some(b) => b.string_value(component),
        None => Ok(match fallback.source() {
            BindingSource::KeyPath(kp) => kp.as_str().to_owned(),
            BindingSource::Constant(v) => value::string_value(v),
        }),
    }
}

/// Writes the text form of a bound value, HTML-escaped unless `escape` is false.
#[derive(Debug)]
pub struct StringElement {
    value: Binding,
    escape: Option<Binding>,
    pub(crate) location: Option<TemplateLocation>,
}

impl StringElement {
    pub fn new(mut bindings: BindingSet) -> TrellisResult<Self> {
        let value = bindings.required("String", "value")?;
        let escape = bindings.take("escape");
        reject_unknown("String", bindings)?;
        Ok(Self {
            value,
            escape,
            location: None,
        })
    }
}

impl Cycleable for StringElement {
    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        let text = self.value.string_value(component)?;
        let escape = match &self.escape {
            Some(b) => b.bool_value(component)?,
            None => true,
        };
        if escape {
            ctx.response().append_escaped(&text);
        } else {
            ctx.response().append_content(&text);
        }
        Ok(())
    }

    fn debug_description(&self) -> DebugDescription {
        let mut d = DebugDescription::from([("value", self.value.to_string())]);
        if let Some(e) = &self.escape {
            d.insert("escape", e.to_string());
        }
        d
    }
}

/// Markup tag whose attributes are bindings. Without content it renders self-closing.
#[derive(Debug)]
pub struct TagElement {
    name: String,
    attributes: Vec<Binding>,
    pub(crate) content: Option<Box<Element>>,
    pub(crate) location: Option<TemplateLocation>,
}

impl TagElement {
    pub fn new(
        name: impl Into<String>,
        bindings: BindingSet,
        content: Option<Element>,
    ) -> TrellisResult<Self> {
        let name = name.into();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(TrellisError::configuration(format!(
                "invalid tag name '{name}'"
            )));
        }
        let attributes = extra_attributes(&name, bindings)?;
        Ok(Self {
            name,
            attributes,
            content: content.map(Box::new),
            location: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Cycleable for TagElement {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        match &self.content {
            Some(c) => c.apply_values(ctx, component),
            None => Ok(()),
        }
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        match &self.content {
            Some(c) => c.invoke_action(ctx, component),
            None => Ok(None),
        }
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.response().append_content("<");
        ctx.response().append_content(&self.name);
        render_attributes(ctx, component, &self.attributes)?;
        match &self.content {
            None => ctx.response().append_content("/>"),
            Some(content) => {
                ctx.response().append_content(">");
                content.render_response(ctx, component)?;
                ctx.response().append_content("</");
                ctx.response().append_content(&self.name);
                ctx.response().append_content(">");
            }
        }
        Ok(())
    }

    fn debug_description(&self) -> DebugDescription {
        let mut d = DebugDescription::from([("name", self.name.clone())]);
        if !self.attributes.is_empty() {
            let attrs: Vec<_> = self
                .attributes
                .iter()
                .map(|b| format!("{}={b}", b.name()))
                .collect();
            d.insert("attributes", attrs.join(" "));
        }
        d
    }
}

/// Text input. Its element id is the form field name; apply-values writes the submitted text
/// back through the `value` binding.
#[derive(Debug)]
pub struct TextFieldElement {
    value: Binding,
    label: Option<Binding>,
    attributes: Vec<Binding>,
    pub(crate) location: Option<TemplateLocation>,
}

impl TextFieldElement {
    pub fn new(mut bindings: BindingSet) -> TrellisResult<Self> {
        let value = bindings.required("TextField", "value")?;
        let label = bindings.take("label");
        let attributes = extra_attributes("TextField", bindings)?;
        Ok(Self {
            value,
            label,
            attributes,
            location: None,
        })
    }
}

impl Cycleable for TextFieldElement {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        let id = ctx.next_element_id()?;
        if let Some(submitted) = ctx.take_form_value(&id) {
            self.value.set_value(Value::String(submitted), component)?;
        }
        Ok(())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        _component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        ctx.next_element_id()?;
        Ok(None)
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        let id = ctx.next_element_id()?;
        let text = self.value.string_value(component)?;
        if ctx.is_recording() {
            let label = label_for(self.label.as_ref(), &self.value, component)?;
            ctx.record_label(&id, &label);
        }
        let out = ctx.response();
        out.append_content("<input type=\"text\" name=\"");
        out.append_content(&id.to_string());
        out.append_content("\" value=\"");
        out.append_escaped(&text);
        out.append_content("\"");
        render_attributes(ctx, component, &self.attributes)?;
        ctx.response().append_content(">");
        Ok(())
    }

    fn validate(&self, vctx: &mut ValidationContext<'_>) {
        if !self.value.is_settable() {
            vctx.error("TextField: 'value' must be a settable key path");
        }
    }

    fn debug_description(&self) -> DebugDescription {
        DebugDescription::from([("value", self.value.to_string())])
    }
}

/// Hyperlink firing its `action` binding when its id comes back as the sender id.
///
/// Occupies one id scope; the scope path is the element id.
#[derive(Debug)]
pub struct ActionElement {
    action: Binding,
    label: Option<Binding>,
    attributes: Vec<Binding>,
    pub(crate) content: Option<Box<Element>>,
    pub(crate) location: Option<TemplateLocation>,
}

impl ActionElement {
    pub fn new(mut bindings: BindingSet, content: Option<Element>) -> TrellisResult<Self> {
        let action = bindings.required("Action", "action")?;
        let label = bindings.take("label");
        let attributes = extra_attributes("Action", bindings)?;
        Ok(Self {
            action,
            label,
            attributes,
            content: content.map(Box::new),
            location: None,
        })
    }
}

impl Cycleable for ActionElement {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        let Some(content) = &self.content else {
            return ctx.run_scoped(|_| Ok(())).map(|_| ());
        };
        ctx.run_scoped(|ctx| content.apply_values(ctx, component))
            .map(|_| ())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        let r = ctx.run_scoped(|ctx| {
            let id = ctx.scope_element_id_path();
            if ctx.is_sender(&id) {
                tracing::debug!(sender = %id, action = %self.action, "firing action");
                return self.action.invoke(component).map(Some);
            }
            match &self.content {
                Some(c) => c.invoke_action(ctx, component),
                None => Ok(None),
            }
        })?;
        Ok(r.flatten())
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.run_scoped(|ctx| {
            let id = ctx.scope_element_id_path();
            if ctx.is_recording() {
                let label = label_for(self.label.as_ref(), &self.action, component)?;
                ctx.record_label(&id, &label);
            }
            ctx.response().append_content("<a href=\"?sender=");
            ctx.response().append_content(&id.to_string());
            ctx.response().append_content("\"");
            render_attributes(ctx, component, &self.attributes)?;
            ctx.response().append_content(">");
            if let Some(content) = &self.content {
                content.render_response(ctx, component)?;
            }
            ctx.response().append_content("</a>");
            Ok(())
        })
        .map(|_| ())
    }

    fn validate(&self, vctx: &mut ValidationContext<'_>) {
        if let BindingSource::KeyPath(kp) = self.action.source()
            && kp.len() != 1
        {
            vctx.error(format!(
                "Action: action key path \"{kp}\" must be a single key"
            ));
        }
    }

    fn debug_description(&self) -> DebugDescription {
        DebugDescription::from([("action", self.action.to_string())])
    }
}

/// Shows `content` when `condition` holds (inverted by `negate`), otherwise the optional
/// `otherwise` branch.
///
/// The conditional occupies one id slot whichever branch runs; each branch reserves its own
/// sub-index inside it so the two branches never share ids.
#[derive(Debug)]
pub struct ConditionalElement {
    condition: Binding,
    negate: Option<Binding>,
    pub(crate) content: Box<Element>,
    pub(crate) otherwise: Option<Box<Element>>,
    pub(crate) location: Option<TemplateLocation>,
}

const THEN_BRANCH: u16 = 1;
const ELSE_BRANCH: u16 = 2;

impl ConditionalElement {
    pub fn new(
        mut bindings: BindingSet,
        content: Element,
        otherwise: Option<Element>,
    ) -> TrellisResult<Self> {
        let condition = bindings.required("Conditional", "condition")?;
        let negate = bindings.take("negate");
        reject_unknown("Conditional", bindings)?;
        Ok(Self {
            condition,
            negate,
            content: Box::new(content),
            otherwise: otherwise.map(Box::new),
            location: None,
        })
    }

    fn branch(&self, component: &dyn Component) -> TrellisResult<Option<(u16, &Element)>> {
        let mut shown = self.condition.bool_value(component)?;
        if let Some(n) = &self.negate {
            shown ^= n.bool_value(component)?;
        }
        Ok(if shown {
            Some((THEN_BRANCH, self.content.as_ref()))
        } else {
            self.otherwise.as_deref().map(|e| (ELSE_BRANCH, e))
        })
    }

    fn run<T>(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
        f: impl FnOnce(&Element, &mut RequestContext, &mut dyn Component) -> TrellisResult<T>,
    ) -> TrellisResult<Option<T>> {
        match self.branch(component)? {
            Some((n, branch)) => ctx.run_scoped_n(n, |ctx| f(branch, ctx, component)),
            None => ctx.run_scoped(|_| Ok(None)).map(Option::flatten),
        }
    }
}

impl Cycleable for ConditionalElement {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.run(ctx, component, |e, ctx, c| e.apply_values(ctx, c))
            .map(|_| ())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        self.run(ctx, component, |e, ctx, c| e.invoke_action(ctx, c))
            .map(Option::flatten)
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.run(ctx, component, |e, ctx, c| e.render_response(ctx, c))
            .map(|_| ())
    }

    fn debug_description(&self) -> DebugDescription {
        let mut d = DebugDescription::from([("condition", self.condition.to_string())]);
        if let Some(n) = &self.negate {
            d.insert("negate", n.to_string());
        }
        d.insert("else", self.otherwise.is_some().to_string());
        d
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/dynamic.rs"]
mod tests;
