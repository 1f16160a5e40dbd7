//! API module - HTTP routes, handlers, and models

pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
pub mod webhooks;
