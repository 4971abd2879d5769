//! Typed RPC procedures served from AWS Lambda.
//!
//! The router Lambda ([`handler`]) dispatches dot-separated procedure paths
//! (`healthCheck`, `privateData`, `hello.*`, `todo.*`) through
//! [`routers::AppRouter`]. The gateway [`interceptor`] resolves sessions for
//! protected procedures before calls reach the router.

pub mod config;
pub mod handler;
pub mod interceptor;
pub mod middleware;
pub mod models;
pub mod ports;
pub mod routers;
pub mod schema;
pub mod utils;
