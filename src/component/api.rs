use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::value::Value;

/// Outcome of a fired action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// Re-render the page that handled the action.
    Stay,
    /// Navigate to the page component with this name.
    Goto(String),
}

/// A stateful node: the live object that bindings resolve key paths against.
///
/// Instances are owned by exactly one page and used by one request at a time; they are never
/// shared between threads concurrently, hence `Send` but not `Sync`.
pub trait Component: Send {
    /// Component name, used in diagnostics and error positions.
    fn name(&self) -> &str;

    /// Resolve a single key (the first segment of a key path).
    fn value_for_key(&self, key: &str) -> TrellisResult<Value>;

    /// Store a value under a single key.
    fn take_value_for_key(&mut self, key: &str, value: Value) -> TrellisResult<()>;

    /// Run the named action method.
    fn perform(&mut self, action: &str) -> TrellisResult<ActionResult> {
        Err(TrellisError::evaluation(format!(
            "component '{}' has no action '{action}'",
            self.name()
        )))
    }

    /// Called before the first use of this instance within a request.
    fn awake(&mut self) {}

    /// Called when the request that awoke this instance is finished with it.
    fn sleep(&mut self) {}
}
