//! REST interface to the analytics pipeline
//!
//! Handlers hold the loaded `Dataset` behind an `Arc` and re-run the
//! filter + aggregate pipeline per request.

pub mod handlers;
