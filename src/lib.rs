//! Compliance document uploader: batch validation, concurrent multipart
//! uploads with per-file progress, and the compliance/budget panels that
//! sit next to them.

pub mod app;
pub mod budget;
pub mod compliance;
pub mod config;
pub mod upload;
pub mod utils;
