//! # CellScene Core Library
//!
//! Ingests mesoscale cell-scene recipes (compartments, ingredients, per-instance
//! placements and curve control points) and turns them into structure
//! definitions and instances for a rendering scene.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models, recipe parsing, color
//!   science, geometry conventions and structure file I/O.
//!
//! - **[`engine`]: The Logic Core.** The stateful part of a load: the seeded
//!   random generator, the per-bucket color allocator, the ingredient resolver
//!   and the [`engine::sink::SceneSink`] collaborator that receives results.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together. A
//!   single call to [`workflows::load::run`] walks a recipe and populates a sink.

pub mod core;
pub mod engine;
pub mod workflows;
