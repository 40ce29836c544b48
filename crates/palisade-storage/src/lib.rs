//! Palisade Storage Library
//!
//! Local-directory persistence for validated uploads: resolving (and creating)
//! the storage directory, picking the final file name, and moving the staged
//! file into place.
//!
//! # Layout
//!
//! Files land directly in the storage directory as `{name}.{type}`, e.g.
//! `uploads/0192f0c47e5a7c3b8d1e2f3a4b5c6d7e_kfhqgmeopjinl.jpeg`.

pub mod local;
pub mod names;

// Re-export commonly used types
pub use local::LocalStorage;
pub use names::{generate_name, resolve_name, sanitize_name};
