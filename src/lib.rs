//! Trellis is the element-tree execution engine of a server-side, component-based web UI.
//!
//! Developers author nested components (a template plus a live state object). Every request
//! drives the page's element tree through three coordinated passes:
//!
//! 1. **Apply values**: submitted form values are written into component state through bindings.
//! 2. **Invoke action**: the element whose id equals the request's sender id fires its action;
//!    the first element to produce a result wins.
//! 3. **Render response**: every element appends its content to the response, in order.
//!
//! Every visited node is named by a hierarchical [`ElementIdPath`] (`1.3.2`) minted by the
//! [`ElementIdGenerator`]. The same node gets the same id in all three passes as long as the tree
//! shape does not change in between, which is what makes sender-id matching work.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Immutable elements**: element trees and [`Binding`]s are built once and shared by all
//!   request threads; per-request state lives in the [`RequestContext`] and the components.
//! - **Explicit registries**: component definitions, interned id paths and the fragment cache are
//!   owned by [`AppResources`], never by statics.
//! - **Conservative skipping**: the skip optimization is opt-in ([`CycleOpts::allows_skipping`]).
#![forbid(unsafe_code)]

mod binding;
mod component;
mod context;
mod cycle;
mod element;
mod element_id;
mod foundation;

pub use binding::bind::{Binding, BindingSet, BindingSource};
pub use binding::keypath::KeyPath;
pub use component::api::{ActionResult, Component};
pub use component::app_def::{AppDef, ComponentDef};
pub use component::dynamic::{DynamicComponent, ScriptedAction};
pub use component::page::Page;
pub use component::registry::{ComponentDefinition, ComponentFactory, ComponentRegistry};
pub use component::store::ComponentStore;
pub use context::request::Request;
pub use context::request_context::{CycleOpts, CycleStats, DebugFlags, Phase, RequestContext};
pub use context::response::{Response, escape_html};
pub use context::semantic::{DefaultSemanticKeys, RecordedLabel, SemanticKeyProvider};
pub use cycle::application::{AppResources, Application, CycleOutcome};
pub use element::builder::{ElementDef, ElementKind, NodeDef, TemplateBuilder};
pub use element::container::{Container, Template};
pub use element::dynamic::{
    ActionElement, ConditionalElement, StringElement, TagElement, TextFieldElement,
};
pub use element::memo::{FragmentCache, FragmentCacheStats, MemoizedFragment};
pub use element::node::{Cycleable, DebugDescription, Element, ElementVisitor, TextElement};
pub use element::reference::ComponentReference;
pub use element::repetition::Repetition;
pub use element::validate::{Diagnostic, Severity, ValidationContext, ValidationReport};
pub use element_id::generator::{ElementIdGenerator, MAX_LEVEL_COUNTER};
pub use element_id::path::ElementIdPath;
pub use element_id::table::ElementIdPathTable;
pub use foundation::error::{TrellisError, TrellisResult};
pub use foundation::location::TemplateLocation;
pub use foundation::value::{Value, bool_value, string_value};
