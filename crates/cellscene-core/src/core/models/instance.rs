use nalgebra::{Point3, UnitQuaternion, Vector4};

/// One placed occurrence of a structure in engine coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub structure_path: String,
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl PlacedInstance {
    pub fn new(structure_path: &str, position: Point3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            structure_path: structure_path.to_string(),
            position,
            rotation,
        }
    }
}

/// One spline of a curve ingredient (e.g. a genome strand).
///
/// Control points are homogeneous with `w = 1` and expressed in engine
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveInstance {
    pub structure_path: String,
    pub control_points: Vec<Vector4<f64>>,
}
