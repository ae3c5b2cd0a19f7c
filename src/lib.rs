pub mod config;
pub mod environment;
pub mod errors;
pub mod id;
pub mod routes;
pub mod store;
pub mod validation;
pub mod video;
