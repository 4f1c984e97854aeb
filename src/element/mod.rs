pub(crate) mod builder;
pub(crate) mod container;
pub(crate) mod dynamic;
pub(crate) mod memo;
pub(crate) mod node;
pub(crate) mod reference;
pub(crate) mod repetition;
pub(crate) mod validate;
