use crate::component::api::ActionResult;
use crate::component::app_def::AppDef;
use crate::component::page::Page;
use crate::component::registry::ComponentRegistry;
use crate::context::request::Request;
use crate::context::request_context::{CycleOpts, CycleStats, RequestContext};
use crate::context::semantic::{DefaultSemanticKeys, RecordedLabel, SemanticKeyProvider};
use crate::element::memo::FragmentCache;
use crate::element_id::table::ElementIdPathTable;
use crate::foundation::error::TrellisResult;
use std::sync::Arc;

/// Everything an application shares between requests: component definitions, the path
/// interning table, the fragment cache and the semantic key provider.
///
/// Built once at startup and passed by reference into every request context.
pub struct AppResources {
    registry: ComponentRegistry,
    paths: ElementIdPathTable,
    fragments: Arc<FragmentCache>,
    semantic_keys: Arc<dyn SemanticKeyProvider>,
}

impl AppResources {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            paths: ElementIdPathTable::new(),
            fragments: Arc::new(FragmentCache::new()),
            semantic_keys: Arc::new(DefaultSemanticKeys),
        }
    }

    /// Replace the provider deriving record-mode labels from repetition keys.
    pub fn with_semantic_keys(mut self, provider: impl SemanticKeyProvider + 'static) -> Self {
        self.semantic_keys = Arc::new(provider);
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn path_table(&self) -> &ElementIdPathTable {
        &self.paths
    }

    pub fn fragment_cache(&self) -> &FragmentCache {
        &self.fragments
    }

    pub(crate) fn fragment_cache_arc(&self) -> Arc<FragmentCache> {
        Arc::clone(&self.fragments)
    }

    pub fn semantic_keys(&self) -> &dyn SemanticKeyProvider {
        self.semantic_keys.as_ref()
    }
}

impl std::fmt::Debug for AppResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppResources")
            .field("registry", &self.registry)
            .field("interned_paths", &self.paths.len())
            .field("cached_fragments", &self.fragments.len())
            .finish_non_exhaustive()
    }
}

/// Result of one request cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Rendered page content.
    pub content: String,
    /// Result of the fired action, if any fired.
    pub action: Option<ActionResult>,
    /// Page that was rendered.
    pub page: String,
    /// Set when the action navigated away from the requested page.
    pub navigated_to: Option<String>,
    pub stats: CycleStats,
    /// Labels captured when recording.
    pub recorded: Vec<RecordedLabel>,
}

/// Drives request cycles over pages of one application. `Sync`: one instance serves every
/// request thread.
#[derive(Debug, Clone)]
pub struct Application {
    resources: Arc<AppResources>,
    opts: CycleOpts,
}

impl Application {
    pub fn new(registry: ComponentRegistry, opts: CycleOpts) -> Self {
        Self::with_resources(AppResources::new(registry), opts)
    }

    pub fn with_resources(resources: AppResources, opts: CycleOpts) -> Self {
        Self {
            resources: Arc::new(resources),
            opts,
        }
    }

    /// Build the registry of `def` and adopt its options.
    pub fn from_def(def: &AppDef) -> TrellisResult<Self> {
        Ok(Self::new(def.build_registry()?, def.options.clone()))
    }

    pub fn opts(&self) -> &CycleOpts {
        &self.opts
    }

    pub fn resources(&self) -> &AppResources {
        &self.resources
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.resources.registry()
    }

    /// New page instance of component `name`.
    pub fn create_page(&self, name: &str) -> TrellisResult<Page> {
        let definition = self.registry().definition(name)?;
        tracing::debug!(page = name, "creating page");
        Ok(Page::new(definition))
    }

    /// Request context for `request` using this application's options.
    pub fn new_context(&self, request: &Request) -> RequestContext {
        RequestContext::new(Arc::clone(&self.resources), request, self.opts.clone())
    }

    /// Run one full cycle: apply values and invoke the action when the request carries any,
    /// navigate when the action names another page, then render the resulting page.
    ///
    /// On navigation `page` is replaced by the new page. The page is put to sleep afterwards
    /// whether or not the cycle succeeded.
    #[tracing::instrument(skip_all, fields(page = %page.name(), sender = ?request.sender_id()))]
    pub fn handle_request(
        &self,
        page: &mut Page,
        request: &Request,
    ) -> TrellisResult<CycleOutcome> {
        let mut ctx = self.new_context(request);
        let r = self.run_cycle(page, &mut ctx, request);
        page.sleep();
        let (action, navigated_to) = r?;
        Ok(CycleOutcome {
            content: ctx.take_content(),
            action,
            page: page.name().to_owned(),
            navigated_to,
            stats: ctx.stats(),
            recorded: ctx.take_recorded(),
        })
    }

    fn run_cycle(
        &self,
        page: &mut Page,
        ctx: &mut RequestContext,
        request: &Request,
    ) -> TrellisResult<(Option<ActionResult>, Option<String>)> {
        let has_sender = request.sender_id().is_some();
        if request.has_form_values() || has_sender {
            page.apply_values(ctx)?;
        }
        let action = if has_sender {
            page.invoke_action(ctx)?
        } else {
            None
        };

        let mut navigated_to = None;
        if let Some(ActionResult::Goto(target)) = &action
            && target != page.name()
        {
            let next = self.create_page(target)?;
            page.sleep();
            *page = next;
            navigated_to = Some(target.clone());
        }

        page.render_response(ctx)?;
        Ok((action, navigated_to))
    }

    /// Render `page` on its own, without apply or invoke.
    pub fn render_page(&self, page: &mut Page) -> TrellisResult<String> {
        let mut ctx = self.new_context(&Request::new());
        let r = page.render_response(&mut ctx);
        page.sleep();
        r?;
        Ok(ctx.take_content())
    }
}
