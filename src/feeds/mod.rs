//! # Feeds Module
//!
//! Podcast feed subscriptions owned by the authenticated user.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;


pub use routes::feeds_routes;
