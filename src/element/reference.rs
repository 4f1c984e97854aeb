use crate::binding::bind::{Binding, BindingSet};
use crate::component::api::{ActionResult, Component};
use crate::component::registry::ComponentDefinition;
use crate::context::request_context::RequestContext;
use crate::element::node::{Cycleable, DebugDescription, Element};
use crate::element::validate::ValidationContext;
use crate::foundation::error::TrellisResult;
use crate::foundation::location::TemplateLocation;

/// Instantiates component `name` at this position, passing `bindings` to it.
///
/// The subcomponent instance is keyed by the reference's scope id within the page, so the
/// same position reaches the same instance in every phase and in later requests.
#[derive(Debug)]
pub struct ComponentReference {
    name: String,
    bindings: Vec<Binding>,
    pub(crate) location: Option<TemplateLocation>,
}

impl ComponentReference {
    pub fn new(name: impl Into<String>, bindings: BindingSet) -> Self {
        Self {
            name: name.into(),
            bindings: bindings.into_remaining(),
            location: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    fn push_bindings(
        &self,
        parent: &dyn Component,
        child: &mut dyn Component,
    ) -> TrellisResult<()> {
        for b in &self.bindings {
            child.take_value_for_key(b.name(), b.value(parent)?)?;
        }
        Ok(())
    }

    fn pull_bindings(
        &self,
        child: &dyn Component,
        parent: &mut dyn Component,
    ) -> TrellisResult<()> {
        for b in self.bindings.iter().filter(|b| b.is_settable()) {
            let updated = child.value_for_key(b.name())?;
            if b.value(parent)? != updated {
                b.set_value(updated, parent)?;
            }
        }
        Ok(())
    }

    fn run<T>(
        &self,
        ctx: &mut RequestContext,
        parent: &mut dyn Component,
        pull: bool,
        f: impl FnOnce(&Element, &mut RequestContext, &mut dyn Component) -> TrellisResult<T>,
    ) -> TrellisResult<Option<T>> {
        ctx.run_scoped(|ctx| {
            let definition = ctx.registry().definition(&self.name)?;
            let key = ctx.scope_element_id_path();
            let mut stored = ctx.components_mut().checkout(&key, &definition);
            let r = self.cycle_child(ctx, &definition, parent, stored.component.as_mut(), pull, f);
            ctx.components_mut().checkin(key, stored);
            r
        })
    }

    fn cycle_child<T>(
        &self,
        ctx: &mut RequestContext,
        definition: &ComponentDefinition,
        parent: &mut dyn Component,
        child: &mut dyn Component,
        pull: bool,
        f: impl FnOnce(&Element, &mut RequestContext, &mut dyn Component) -> TrellisResult<T>,
    ) -> TrellisResult<T> {
        self.push_bindings(parent, child)?;
        let template = definition.template();
        ctx.enter_component(definition.name());
        let r = f(template.as_ref(), ctx, child).map_err(|e| ctx.locate(e, template.location()));
        ctx.leave_component();
        let out = r?;
        if pull {
            self.pull_bindings(child, parent)?;
        }
        Ok(out)
    }
}

impl Cycleable for ComponentReference {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.run(ctx, component, true, |t, ctx, c| t.apply_values(ctx, c))
            .map(|_| ())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        self.run(ctx, component, true, |t, ctx, c| t.invoke_action(ctx, c))
            .map(Option::flatten)
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        self.run(ctx, component, false, |t, ctx, c| t.render_response(ctx, c))
            .map(|_| ())
    }

    fn validate(&self, vctx: &mut ValidationContext<'_>) {
        let Some(registry) = vctx.registry() else {
            return;
        };
        let Some(definition) = registry.get(&self.name) else {
            vctx.error(format!("unknown component '{}'", self.name));
            return;
        };
        if let Some(api) = definition.api() {
            for b in &self.bindings {
                if !api.contains(b.name()) {
                    vctx.error(format!(
                        "unknown binding '{}' for component '{}'",
                        b.name(),
                        self.name
                    ));
                }
            }
        }
        for required in definition.required() {
            if !self.bindings.iter().any(|b| b.name() == required) {
                vctx.error(format!(
                    "missing required binding '{required}' for component '{}'",
                    self.name
                ));
            }
        }
    }

    fn debug_description(&self) -> DebugDescription {
        let names: Vec<_> = self.bindings.iter().map(Binding::name).collect();
        DebugDescription::from([
            ("component", self.name.clone()),
            ("bindings", names.join(",")),
        ])
    }
}
