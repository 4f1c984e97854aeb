use crate::binding::bind::{Binding, BindingSet};
use crate::component::api::{ActionResult, Component};
use crate::context::request_context::RequestContext;
use crate::element::node::{Cycleable, DebugDescription, Element};
use crate::element_id::path::ElementIdPath;
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::location::TemplateLocation;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use xxhash_rust::xxh3::{Xxh3, xxh3_64};

/// Lookup counters of a [`FragmentCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FragmentCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Renders whose result was dropped because another request published first.
    pub lost_races: u64,
}

impl FragmentCacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Application-wide cache of rendered fragments, shared by all requests.
///
/// Population is double-checked: a read-locked probe, then the fragment is rendered with no
/// lock held, then published under the write lock. The first published value wins; a racing
/// render is discarded and the winner's content is returned to every caller.
#[derive(Debug, Default)]
pub struct FragmentCache {
    entries: RwLock<HashMap<u64, Arc<str>>>,
    stats: Mutex<FragmentCacheStats>,
}

impl FragmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached fragment for `key`.
    pub fn get(&self, key: u64) -> Option<Arc<str>> {
        self.entries.read().get(&key).cloned()
    }

    /// Return the fragment for `key`, rendering it with `render` on a miss.
    ///
    /// A failed render caches nothing and its error is returned to the caller.
    pub fn get_or_try_insert_with(
        &self,
        key: u64,
        render: impl FnOnce() -> TrellisResult<String>,
    ) -> TrellisResult<Arc<str>> {
        if let Some(hit) = self.get(key) {
            self.stats.lock().hits += 1;
            return Ok(hit);
        }
        self.stats.lock().misses += 1;
        tracing::debug!(key, "fragment cache miss");

        let rendered: Arc<str> = Arc::from(render()?);
        let mut entries = self.entries.write();
        if let Some(winner) = entries.get(&key) {
            self.stats.lock().lost_races += 1;
            return Ok(Arc::clone(winner));
        }
        entries.insert(key, Arc::clone(&rendered));
        Ok(rendered)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> FragmentCacheStats {
        *self.stats.lock()
    }
}

/// Content whose rendered output depends only on the value of `key`.
///
/// Render output is cached application-wide per (fragment, id position, key text). Apply and
/// invoke still traverse the content. The fragment occupies one id scope, so a cache hit does not
/// shift the ids of the siblings that follow it.
#[derive(Debug)]
pub struct MemoizedFragment {
    key: Binding,
    slot: u64,
    pub(crate) content: Box<Element>,
    pub(crate) location: Option<TemplateLocation>,
}

impl MemoizedFragment {
    pub fn new(mut bindings: BindingSet, content: Element) -> TrellisResult<Self> {
        let key = bindings.required("Memoized", "key")?;
        if let Some(name) = bindings.names().next() {
            return Err(TrellisError::configuration(format!(
                "Memoized: unknown binding '{name}'"
            )));
        }
        let slot = xxh3_64(format!("{key}|{content:?}").as_bytes());
        Ok(Self {
            key,
            slot,
            content: Box::new(content),
            location: None,
        })
    }

    fn cache_key(&self, scope: &ElementIdPath, key_text: &str) -> u64 {
        let mut h = Xxh3::new();
        h.update(&self.slot.to_le_bytes());
        if let Some(loc) = &self.location {
            h.update(loc.to_string().as_bytes());
        }
        // Rendered ids depend on where the fragment sits.
        for level in scope.levels() {
            h.update(&level.to_le_bytes());
        }
        h.update(&[0xff]);
        h.update(key_text.as_bytes());
        h.digest()
    }
}

impl Cycleable for MemoizedFragment {
    fn apply_values(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        ctx.run_scoped(|ctx| self.content.apply_values(ctx, component))
            .map(|_| ())
    }

    fn invoke_action(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<Option<ActionResult>> {
        ctx.run_scoped(|ctx| self.content.invoke_action(ctx, component))
            .map(Option::flatten)
    }

    fn render_response(
        &self,
        ctx: &mut RequestContext,
        component: &mut dyn Component,
    ) -> TrellisResult<()> {
        let key_text = self.key.string_value(component)?;
        let cache = ctx.fragment_cache();
        ctx.run_scoped(|ctx| {
            let key = self.cache_key(&ctx.scope_element_id_path(), &key_text);
            let fragment = cache.get_or_try_insert_with(key, || {
                ctx.capture(|ctx| self.content.render_response(ctx, component))
            })?;
            ctx.response().append_content(&fragment);
            Ok(())
        })
        .map(|_| ())
    }

    fn debug_description(&self) -> DebugDescription {
        DebugDescription::from([
            ("key", self.key.to_string()),
            ("slot", format!("{:016x}", self.slot)),
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/element/memo.rs"]
mod tests;
