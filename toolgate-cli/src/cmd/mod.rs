pub mod call;
pub mod routes;
pub mod scan;
pub mod validate;
