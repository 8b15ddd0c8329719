// Feedline - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: platform, app, or any file I/O directly.

pub mod bucket;
pub mod clock;
pub mod export;
pub mod ingest;
pub mod model;
pub mod relative;
pub mod thread;
pub mod timeline;
