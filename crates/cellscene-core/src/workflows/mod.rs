//! # Workflows Module
//!
//! High-level entry points that tie [`core`](crate::core) and
//! [`engine`](crate::engine) together.
//!
//! - **Load Workflow** ([`load`]) - Walks a recipe in document order, resolves every
//!   ingredient against a structure source and streams the results into a scene sink.

pub mod load;
