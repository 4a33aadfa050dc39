//! HTTP API - routes, handlers and the inbound request type

pub mod handlers;
pub mod request;
pub mod routes;
