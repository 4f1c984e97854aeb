use crate::component::api::Component;
use crate::component::registry::ComponentRegistry;
use crate::component::store::ComponentStore;
use crate::context::request::Request;
use crate::context::response::Response;
use crate::context::semantic::RecordedLabel;
use crate::cycle::application::AppResources;
use crate::element::memo::FragmentCache;
use crate::element_id::generator::ElementIdGenerator;
use crate::element_id::path::ElementIdPath;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::location::TemplateLocation;
use crate::foundation::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One of the three passes over the element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Push submitted form values into component state.
    ApplyValues,
    /// Fire the action of the element whose id is the sender id.
    InvokeAction,
    /// Emit the page content.
    RenderResponse,
}

/// Debug and record/playback switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    /// Maintain a stack of template locations while traversing (reported in errors).
    pub track_template_stack: bool,
    /// Record semantic labels of UI elements during render.
    pub record_playback: bool,
}

/// Per-application request-cycle options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleOpts {
    /// Allow apply/invoke to skip subtrees and siblings that provably contain no target.
    ///
    /// Off by default: skipping is only sound when sibling counts do not vary between phases.
    pub allows_skipping: bool,
    /// Debug and recording switches.
    pub debug: DebugFlags,
}

/// Traversal counters of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    /// Elements visited during apply-values.
    pub visited_apply: u64,
    /// Elements visited during invoke-action.
    pub visited_invoke: u64,
    /// Elements visited during render-response.
    pub visited_render: u64,
    /// Scopes stepped over without being entered.
    pub scopes_skipped: u64,
    /// Trailing siblings not visited because no target remained.
    pub siblings_skipped: u64,
}

/// Mutable state of one request: the live id generator, submitted data, the response, and the
/// debug/record flags. Created per request and never shared between threads.
pub struct RequestContext {
    resources: Arc<AppResources>,
    opts: CycleOpts,
    phase: Phase,
    generator: ElementIdGenerator,
    sender_id: Option<ElementIdPath>,
    form_values: BTreeMap<ElementIdPath, Vec<String>>,
    response: Response,
    components: ComponentStore,
    component_path: Vec<String>,
    template_stack: Vec<TemplateLocation>,
    semantic_prefixes: Vec<String>,
    recorded: Vec<RecordedLabel>,
    stats: CycleStats,
}

impl RequestContext {
    /// Create the context for `request`. Unparsable ids are dropped with a warning.
    ///
    /// Submitted ids are parsed but not interned: the path table only holds ids the generator
    /// minted, so its size does not depend on what clients post.
    pub fn new(resources: Arc<AppResources>, request: &Request, opts: CycleOpts) -> Self {
        let sender_id = request
            .sender_id()
            .and_then(|raw| match raw.parse::<ElementIdPath>() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(sender = raw, error = %e, "ignoring unparsable sender id");
                    None
                }
            });

        let mut form_values = BTreeMap::new();
        for (raw, values) in request.form_values() {
            match raw.parse::<ElementIdPath>() {
                Ok(p) => {
                    form_values.insert(p, values.clone());
                }
                Err(e) => {
                    tracing::warn!(key = raw.as_str(), error = %e, "ignoring unparsable form key");
                }
            }
        }

        Self {
            resources,
            opts,
            phase: Phase::RenderResponse,
            generator: ElementIdGenerator::new(),
            sender_id,
            form_values,
            response: Response::new(),
            components: ComponentStore::default(),
            component_path: Vec::new(),
            template_stack: Vec::new(),
            semantic_prefixes: Vec::new(),
            recorded: Vec::new(),
            stats: CycleStats::default(),
        }
    }

    /// Start a pass: reset the generator and the scoping stacks.
    pub fn begin_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.generator.reset();
        self.component_path.clear();
        self.template_stack.clear();
        self.semantic_prefixes.clear();
    }

    /// Current pass.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Options in effect.
    pub fn opts(&self) -> &CycleOpts {
        &self.opts
    }

    /// Debug flags in effect.
    pub fn debug_flags(&self) -> &DebugFlags {
        &self.opts.debug
    }

    /// `true` when recording semantic labels.
    pub fn is_recording(&self) -> bool {
        self.opts.debug.record_playback
    }

    /// `true` if the skip optimization is enabled for this request.
    pub fn allows_skipping(&self) -> bool {
        self.opts.allows_skipping
    }

    /// Component definitions of the application.
    pub fn registry(&self) -> &ComponentRegistry {
        self.resources.registry()
    }

    pub(crate) fn fragment_cache(&self) -> Arc<FragmentCache> {
        self.resources.fragment_cache_arc()
    }

    // ---- element ids ----

    /// Mint the id of the element being visited.
    pub fn next_element_id(&mut self) -> TrellisResult<ElementIdPath> {
        self.generator.next_element_id()
    }

    /// Enter a child scope. Pair with [`pop_element_id_level`](Self::pop_element_id_level).
    pub fn push_element_id_level(&mut self) -> TrellisResult<()> {
        self.generator.push_level()
    }

    /// Leave the innermost child scope.
    pub fn pop_element_id_level(&mut self) {
        self.generator.pop_level();
    }

    /// Enter a scope reserving sub-index `n` (two levels).
    pub fn push_element_id_level_n(&mut self, n: u16) -> TrellisResult<()> {
        self.generator.push_level_n(n)
    }

    /// Leave the two levels entered by [`push_element_id_level_n`](Self::push_element_id_level_n).
    pub fn pop_element_id_level_n(&mut self) {
        self.generator.pop_level_n();
    }

    /// Current generator depth (1 at the root).
    pub fn element_id_depth(&self) -> usize {
        self.generator.depth()
    }

    /// Interned snapshot of the current position.
    pub fn current_element_id_path(&self) -> ElementIdPath {
        self.resources.path_table().intern(self.generator.levels())
    }

    /// Interned id of the innermost open scope.
    pub fn scope_element_id_path(&self) -> ElementIdPath {
        self.resources
            .path_table()
            .intern(self.generator.scope_levels())
    }

    /// `true` if the next id minted would be `path` or one of its ancestors.
    pub fn next_prefix_matches(&self, path: &ElementIdPath) -> bool {
        self.generator.next_prefix_matches(path)
    }

    /// Run `f` inside a child scope; the scope is popped on every exit path.
    pub fn with_element_id_level<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> TrellisResult<T>,
    ) -> TrellisResult<T> {
        self.generator.push_level()?;
        let r = f(self);
        self.generator.pop_level();
        r
    }

    /// Like [`with_element_id_level`](Self::with_element_id_level), but steps over the scope
    /// (returning `None`) when skipping is allowed and the scope provably holds no target.
    pub fn run_scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> TrellisResult<T>,
    ) -> TrellisResult<Option<T>> {
        if self.can_skip_next_scope() {
            tracing::trace!(
                phase = ?self.phase,
                at = %self.generator.current_element_id_path(),
                "skipping scope"
            );
            self.generator.skip_level()?;
            self.stats.scopes_skipped += 1;
            return Ok(None);
        }
        self.with_element_id_level(f).map(Some)
    }

    /// Two-level variant of [`run_scoped`](Self::run_scoped): the scope reserves sub-index `n`,
    /// so ids minted by `f` look like `<scope>.n.<k>`.
    pub fn run_scoped_n<T>(
        &mut self,
        n: u16,
        f: impl FnOnce(&mut Self) -> TrellisResult<T>,
    ) -> TrellisResult<Option<T>> {
        if self.can_skip_next_scope() {
            self.generator.skip_level()?;
            self.stats.scopes_skipped += 1;
            return Ok(None);
        }
        self.generator.push_level_n(n)?;
        let r = f(self);
        self.generator.pop_level_n();
        r.map(Some)
    }

    fn can_skip_next_scope(&mut self) -> bool {
        if !self.opts.allows_skipping {
            return false;
        }
        match self.phase {
            Phase::ApplyValues => match self.target_form_id_path() {
                Some(target) => !self.generator.next_prefix_matches(&target),
                None => true,
            },
            Phase::InvokeAction => match &self.sender_id {
                Some(sender) => !self.generator.next_prefix_matches(sender),
                None => true,
            },
            Phase::RenderResponse => false,
        }
    }

    // ---- submitted data ----

    /// Id of the control that triggered the current action.
    pub fn request_sender_id(&self) -> Option<&ElementIdPath> {
        self.sender_id.as_ref()
    }

    /// `true` if `id` is the sender id.
    pub fn is_sender(&self, id: &ElementIdPath) -> bool {
        self.sender_id.as_ref() == Some(id)
    }

    /// Consume the submitted value for `id` (the first one if several were posted).
    pub fn take_form_value(&mut self, id: &ElementIdPath) -> Option<String> {
        self.form_values
            .remove(id)
            .and_then(|values| values.into_iter().next())
    }

    /// The next pending form target still reachable by the remainder of this pass, or `None`
    /// once no further apply target exists. Targets already passed are discarded.
    pub fn target_form_id_path(&mut self) -> Option<ElementIdPath> {
        while let Some(first) = self.form_values.keys().next().cloned() {
            if self.generator.has_passed(&first) {
                self.form_values.remove(&first);
                continue;
            }
            return Some(first);
        }
        None
    }

    pub(crate) fn note_siblings_skipped(&mut self, n: usize) {
        self.stats.siblings_skipped += n as u64;
    }

    /// `true` when skipping is allowed and no apply target remains reachable.
    pub(crate) fn apply_exhausted(&mut self) -> bool {
        self.opts.allows_skipping && self.target_form_id_path().is_none()
    }

    // ---- response ----

    /// Response sink of the current request.
    pub fn response(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Render into a scratch buffer and return what was written.
    pub fn capture(
        &mut self,
        f: impl FnOnce(&mut Self) -> TrellisResult<()>,
    ) -> TrellisResult<String> {
        let outer = std::mem::take(&mut self.response);
        let r = f(self);
        let captured = std::mem::replace(&mut self.response, outer).take_content();
        r.map(|()| captured)
    }

    /// Take the rendered content.
    pub fn take_content(&mut self) -> String {
        self.response.take_content()
    }

    // ---- components ----

    pub(crate) fn install_components(&mut self, store: ComponentStore) {
        self.components = store;
    }

    pub(crate) fn take_components(&mut self) -> ComponentStore {
        std::mem::take(&mut self.components)
    }

    pub(crate) fn components_mut(&mut self) -> &mut ComponentStore {
        &mut self.components
    }

    /// Enter a component boundary (for error positions).
    pub fn enter_component(&mut self, name: &str) {
        self.component_path.push(name.to_owned());
    }

    /// Leave the innermost component boundary.
    pub fn leave_component(&mut self) {
        self.component_path.pop();
    }

    /// Slash-separated names of the enclosing components.
    pub fn component_path(&self) -> String {
        self.component_path.join("/")
    }

    /// Attach the current tree position to `err` (no-op if it already carries one).
    pub fn locate(&self, err: TrellisError, location: Option<&TemplateLocation>) -> TrellisError {
        if err.is_located() {
            return err;
        }
        let location = location
            .cloned()
            .or_else(|| self.template_stack.last().cloned());
        err.located(
            self.component_path(),
            self.generator.current_element_id_path().to_string(),
            location,
        )
    }

    // ---- debug / recording ----

    pub(crate) fn push_template_location(&mut self, location: &TemplateLocation) {
        self.template_stack.push(location.clone());
    }

    pub(crate) fn pop_template_location(&mut self) {
        self.template_stack.pop();
    }

    /// Innermost template location being traversed (when stack tracking is on).
    pub fn current_template_location(&self) -> Option<&TemplateLocation> {
        self.template_stack.last()
    }

    /// Label for a repetition key via the application's semantic key provider.
    pub fn semantic_key_for(&self, key: &Value, component: &dyn Component) -> Option<String> {
        self.resources.semantic_keys().semantic_key(key, component)
    }

    /// Push a scoping prefix for labels recorded below.
    pub fn push_semantic_prefix(&mut self, prefix: String) {
        self.semantic_prefixes.push(prefix);
    }

    /// Pop the innermost scoping prefix.
    pub fn pop_semantic_prefix(&mut self) {
        self.semantic_prefixes.pop();
    }

    /// Record `label` for element `id`, prefixed by the enclosing semantic scopes.
    pub fn record_label(&mut self, id: &ElementIdPath, label: &str) {
        if !self.is_recording() {
            return;
        }
        let mut full = self.semantic_prefixes.join(".");
        if !full.is_empty() {
            full.push('.');
        }
        full.push_str(label);
        self.recorded.push(RecordedLabel {
            element_id: id.to_string(),
            label: full,
        });
    }

    /// Labels recorded so far.
    pub fn recorded(&self) -> &[RecordedLabel] {
        &self.recorded
    }

    pub(crate) fn take_recorded(&mut self) -> Vec<RecordedLabel> {
        std::mem::take(&mut self.recorded)
    }

    pub(crate) fn note_visit(&mut self) {
        match self.phase {
            Phase::ApplyValues => self.stats.visited_apply += 1,
            Phase::InvokeAction => self.stats.visited_invoke += 1,
            Phase::RenderResponse => self.stats.visited_render += 1,
        }
    }

    /// Traversal counters so far.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("phase", &self.phase)
            .field("element_id", &self.generator.current_element_id_path())
            .field("sender_id", &self.sender_id)
            .field("pending_form_values", &self.form_values.len())
            .field("component_path", &self.component_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/request_context.rs"]
mod tests;
