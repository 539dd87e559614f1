//! Stateless data models shared by every layer of the library.
//!
//! - [`atom`] - atoms as delivered by a structure source and the spheres derived from them
//! - [`structure`] - the shared per-ingredient [`StructureDefinition`](structure::StructureDefinition)
//! - [`instance`] - placed particle and curve instances handed to a scene sink
//! - [`ids`] - slot-map handles used by the in-memory scene store

pub mod atom;
pub mod ids;
pub mod instance;
pub mod structure;
