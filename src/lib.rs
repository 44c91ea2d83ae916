//! Outfit recommendation service.
//!
//! Loads a catalog of outfit images keyed by gender, style and temperature
//! band, and serves a step-by-step wizard plus a direct recommendation query
//! over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
