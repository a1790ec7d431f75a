pub mod catalog;
pub mod model;
pub mod schema;
pub mod server;
