pub(crate) mod request;
pub(crate) mod request_context;
pub(crate) mod response;
pub(crate) mod semantic;
