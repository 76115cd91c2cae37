//! basic-auth-gateway - HTTP Basic authentication in front of a static site
//!
//! This crate provides a gateway that checks Basic credentials and per-user
//! path grants before any resource is served.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod resource;
pub mod server;
