//! Analytical core for the Brasil e-commerce delivery dashboard
//!
//! Pipeline: `dataset` loads the two CSV tables once into an immutable
//! snapshot, `filters` narrows them per user selection, and `aggregates`
//! turns the filtered views into the values each chart and table shows.
//! The CLI binary and the REST API in `api` are thin consumers.

pub mod aggregates;
pub mod api;
pub mod dataset;
pub mod filters;
pub mod models;
pub mod state_names;
pub mod stats;
