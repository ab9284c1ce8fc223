//! Middleware for the search API.

pub mod cors;

pub use cors::create_cors_layer;
