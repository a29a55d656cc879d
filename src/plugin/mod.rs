pub mod api;
pub mod error;
pub mod executor;
pub mod model;
pub mod request;
