//! # Engine Module
//!
//! The stateful part of a recipe load.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Palette size, relaxation strategy and seed
//! - **Load State** ([`context`], [`bucket`]) - The seeded generator, the shared palette and
//!   the per-branch color allocators
//! - **Resolution** ([`resolver`], [`curves`]) - Turning ingredient entries into structures,
//!   instances and curves
//! - **Output** ([`sink`], [`store`]) - The collaborator that receives results and an
//!   in-memory implementation of it
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Fatal engine errors and non-fatal ingredient issues

pub mod bucket;
pub mod config;
pub mod context;
pub mod curves;
pub mod error;
pub mod progress;
pub mod resolver;
pub mod sink;
pub mod store;
