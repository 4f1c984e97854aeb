pub(crate) mod bind;
pub(crate) mod keypath;
