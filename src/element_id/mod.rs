pub(crate) mod generator;
pub(crate) mod path;
pub(crate) mod table;
