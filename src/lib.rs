//! Media Finder Library
//!
//! Search movies, series and games on OMDb, keep a per-session liked list,
//! and turn free-text descriptions into AI-recommended titles.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod preflight;
pub mod services;
pub mod testing;

pub use error::{Error, Result};
