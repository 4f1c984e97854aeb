pub(crate) mod api;
pub(crate) mod app_def;
pub(crate) mod dynamic;
pub(crate) mod page;
pub(crate) mod registry;
pub(crate) mod store;
