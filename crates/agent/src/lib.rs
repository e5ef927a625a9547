//! `airwatch-agent` library crate.
//!
//! Polls an air-quality snapshot endpoint, keeps a rolling window of
//! history per metric, classifies each reading and hands the result to a
//! [`RenderAdapter`](render::RenderAdapter). The binary entrypoint lives in
//! `main.rs`.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod render;
pub mod scheduler;
pub mod snapshot;
pub mod source;
