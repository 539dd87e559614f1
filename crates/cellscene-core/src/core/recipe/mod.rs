//! Typed representation of a scene recipe document.
//!
//! A recipe is parsed and validated in a single pass ([`Recipe::from_path`],
//! [`str::parse`]). Every structural problem is reported up front as
//! [`RecipeError::Malformed`] with the offending location, so the load pipeline
//! only ever sees well-formed [`IngredientEntry`] values.
//!
//! The document layout consumed is:
//!
//! - `cytoplasme.ingredients` (optional)
//! - `compartments.<name>.interior.ingredients` / `compartments.<name>.surface.ingredients`
//! - per ingredient: `name`, `source.pdb`, `source.biomt`, `source.transform.center`,
//!   `results` (`[[x, y, z], [qx, qy, qz, qw]]` rows), or `nbCurve` plus `curve<i>` point lists

pub mod model;
pub mod parser;

pub use model::{
    Compartment, CurveIngredient, IngredientBlock, IngredientEntry, IngredientSource,
    ParticleIngredient, Placement, Recipe, StructureRef,
};
pub use parser::RecipeError;
