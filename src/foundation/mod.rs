pub(crate) mod error;
pub(crate) mod location;
pub(crate) mod value;
