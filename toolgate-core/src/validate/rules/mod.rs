pub(crate) mod common;
pub(crate) mod main;
pub(crate) mod parameters;
pub(crate) mod route;
