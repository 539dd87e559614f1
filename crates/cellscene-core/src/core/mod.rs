//! # Core Module
//!
//! Stateless building blocks for turning a scene recipe into renderable
//! structures and instances.
//!
//! ## Architecture
//!
//! - **Scene Data** ([`models`]) - Atom sets, structure definitions and placed instances
//! - **Recipe Documents** ([`recipe`]) - Parsing and validation of recipe JSON
//! - **Color Generation** ([`color`]) - Perceptual palettes in CIE Lab space
//! - **Geometry** ([`utils::geometry`]) - Bounding spheres, axis conventions and symmetry expansion
//! - **File I/O** ([`io`]) - Structure sources backed by PDB and sphere files

pub mod color;
pub mod io;
pub mod models;
pub mod recipe;
pub mod utils;
