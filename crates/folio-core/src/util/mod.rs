//! Filesystem utilities.
//!
//! # Modules
//!
//! - [`paths`]: Root-confined path parsing and resolution
//! - [`walker`]: Directory listing and lazy depth-first document traversal

pub mod paths;
pub mod walker;
