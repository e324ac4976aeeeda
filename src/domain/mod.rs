pub mod host;
pub mod models;
