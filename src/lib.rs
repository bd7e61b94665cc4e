//! TV show recommendations from a set of favorites.
//!
//! Noisy titles are resolved against the catalog with fuzzy matching, the
//! favorites' embedding vectors are averaged into a query, and the rest of
//! the catalog is ranked by cosine similarity to it.

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use error::{AppError, AppResult};
