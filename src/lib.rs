//! complaints-api - HTTP service for registering complaints
//!
//! - `GET /` liveness probe
//! - catch-all under a configurable prefix (`/api` by default)
//! - `POST <mount>/complaints` for every configured mount point
//! - permissive CORS and JSON body parsing on every route

pub mod api;
pub mod complaints;
pub mod config;
pub mod error;

pub use error::{Error, Result};
