use crate::component::api::Component;
use crate::component::registry::ComponentDefinition;
use crate::element_id::path::ElementIdPath;
use std::collections::HashMap;

/// A subcomponent instance kept by a page between requests.
pub(crate) struct StoredComponent {
    definition: String,
    awake: bool,
    pub(crate) component: Box<dyn Component>,
}

/// Subcomponent instances of one page, keyed by the element-id path of their reference.
///
/// Instances are checked out while their template runs and checked back in afterwards, so the
/// parent and child component can be borrowed mutably at the same time.
#[derive(Default)]
pub struct ComponentStore {
    instances: HashMap<ElementIdPath, StoredComponent>,
}

impl ComponentStore {
    /// Take the instance for `key`, creating it from `definition` when absent (or when the slot
    /// holds an instance of another component). The instance is awoken on first use.
    pub(crate) fn checkout(
        &mut self,
        key: &ElementIdPath,
        definition: &ComponentDefinition,
    ) -> StoredComponent {
        let mut stored = match self.instances.remove(key) {
            Some(s) if s.definition == definition.name() => s,
            _ => {
                tracing::debug!(
                    component = definition.name(),
                    at = %key,
                    "instantiating subcomponent"
                );
                StoredComponent {
                    definition: definition.name().to_owned(),
                    awake: false,
                    component: definition.instantiate(),
                }
            }
        };
        if !stored.awake {
            stored.component.awake();
            stored.awake = true;
        }
        stored
    }

    /// Return an instance taken with [`checkout`](Self::checkout).
    pub(crate) fn checkin(&mut self, key: ElementIdPath, stored: StoredComponent) {
        self.instances.insert(key, stored);
    }

    /// Put every awake instance to sleep.
    pub fn sleep_all(&mut self) {
        for stored in self.instances.values_mut() {
            if stored.awake {
                stored.component.sleep();
                stored.awake = false;
            }
        }
    }

    /// Instance stored for `key`.
    pub fn get(&self, key: &ElementIdPath) -> Option<&dyn Component> {
        self.instances.get(key).map(|s| s.component.as_ref())
    }

    /// Number of stored instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// `true` if no instance is stored.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Keys of the stored instances, in depth-first order.
    pub fn keys(&self) -> Vec<ElementIdPath> {
        let mut keys: Vec<_> = self.instances.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.instances
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.definition.as_str())),
            )
            .finish()
    }
}
