use crate::component::api::{ActionResult, Component};
use crate::component::registry::ComponentDefinition;
use crate::component::store::ComponentStore;
use crate::context::request_context::{Phase, RequestContext};
use crate::element::node::{Cycleable, Element};
use crate::foundation::error::TrellisResult;
use std::sync::Arc;

/// A top-level component instance together with the subcomponents created beneath it.
pub struct Page {
    definition: Arc<ComponentDefinition>,
    root: Box<dyn Component>,
    subcomponents: ComponentStore,
    awake: bool,
}

impl Page {
    /// Instantiate page component `definition`.
    pub fn new(definition: Arc<ComponentDefinition>) -> Self {
        let root = definition.instantiate();
        Self {
            definition,
            root,
            subcomponents: ComponentStore::default(),
            awake: false,
        }
    }

    /// Page component name.
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Root component state.
    pub fn root(&self) -> &dyn Component {
        self.root.as_ref()
    }

    /// Mutable root component state.
    pub fn root_mut(&mut self) -> &mut dyn Component {
        self.root.as_mut()
    }

    /// Subcomponent instances created so far.
    pub fn subcomponents(&self) -> &ComponentStore {
        &self.subcomponents
    }

    /// Phase 1: push submitted form values into component state.
    #[tracing::instrument(skip_all, fields(page = %self.name()))]
    pub fn apply_values(&mut self, ctx: &mut RequestContext) -> TrellisResult<()> {
        self.run_phase(ctx, Phase::ApplyValues, |t, ctx, c| t.apply_values(ctx, c))
    }

    /// Phase 2: fire the action of the sender element, if any.
    #[tracing::instrument(skip_all, fields(page = %self.name()))]
    pub fn invoke_action(
        &mut self,
        ctx: &mut RequestContext,
    ) -> TrellisResult<Option<ActionResult>> {
        self.run_phase(ctx, Phase::InvokeAction, |t, ctx, c| t.invoke_action(ctx, c))
    }

    /// Phase 3: render the page into the context's response.
    #[tracing::instrument(skip_all, fields(page = %self.name()))]
    pub fn render_response(&mut self, ctx: &mut RequestContext) -> TrellisResult<()> {
        self.run_phase(ctx, Phase::RenderResponse, |t, ctx, c| {
            t.render_response(ctx, c)
        })
    }

    /// End of request: put the page and its subcomponents to sleep.
    pub fn sleep(&mut self) {
        if self.awake {
            self.root.sleep();
            self.awake = false;
        }
        self.subcomponents.sleep_all();
    }

    fn run_phase<T>(
        &mut self,
        ctx: &mut RequestContext,
        phase: Phase,
        f: impl FnOnce(&Element, &mut RequestContext, &mut dyn Component) -> TrellisResult<T>,
    ) -> TrellisResult<T> {
        ctx.begin_phase(phase);
        if !self.awake {
            self.root.awake();
            self.awake = true;
        }

        let template = Arc::clone(self.definition.template());
        ctx.install_components(std::mem::take(&mut self.subcomponents));
        ctx.enter_component(self.definition.name());
        let r = f(template.as_ref(), ctx, self.root.as_mut())
            .map_err(|e| ctx.locate(e, template.location()));
        ctx.leave_component();
        self.subcomponents = ctx.take_components();

        if ctx.element_id_depth() != 1 {
            tracing::warn!(
                phase = ?phase,
                depth = ctx.element_id_depth(),
                "element id levels unbalanced after pass"
            );
        }
        r
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name())
            .field("subcomponents", &self.subcomponents)
            .field("awake", &self.awake)
            .finish_non_exhaustive()
    }
}
