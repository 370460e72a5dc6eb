//! Library crate for league-console, exposing modules for binaries and integration tests.

pub mod config;
/// Wire models and the league backend client.
pub mod dao;
/// Request and response payloads of the HTTP API.
pub mod dto;
/// HTTP error mapping.
pub mod error;
/// Axum route trees.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state, live board and match state machines.
pub mod state;
