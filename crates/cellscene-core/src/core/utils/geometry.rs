//! Transform math shared by the resolver.
//!
//! Every axis-convention decision lives here. Recipe and PDB data use the
//! editor convention (right-handed, Y up); instances are emitted in the engine
//! convention, which mirrors the X axis. Concretely:
//!
//! - positions map as `(x, y, z) -> (-x, y, z)`;
//! - rotations are decomposed into static X-Y-Z Euler angles (`R = Rz·Ry·Rx`),
//!   the Y and Z angles are negated and the result is recomposed as `qz·qy·qx`,
//!   which equals conjugating the rotation with `diag(-1, 1, 1)`;
//! - symmetry translations take the same X negation as positions.

use crate::core::models::atom::AtomSphere;
use crate::core::models::structure::BoundingSphere;
use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, UnitQuaternion, Vector3};
use thiserror::Error;

const EULER_EPSILON: f64 = 4.0 * f64::EPSILON;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Cannot compute a bounding sphere for an empty atom set")]
    EmptyInput,
}

/// Computes a sphere that contains every atom sphere.
///
/// The center is the midpoint of the axis-aligned box spanned by the atom
/// centers; the radius is the largest `distance(center, atom) + atom.radius`.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyInput`] for an empty slice.
pub fn compute_bounding_sphere(atoms: &[AtomSphere]) -> Result<BoundingSphere, GeometryError> {
    let first = atoms.first().ok_or(GeometryError::EmptyInput)?;
    let (min, max) = atoms.iter().fold(
        (first.center.coords, first.center.coords),
        |(min, max), atom| (min.inf(&atom.center.coords), max.sup(&atom.center.coords)),
    );
    let center = Point3::from((min + max) * 0.5);
    let radius = atoms
        .iter()
        .map(|atom| nalgebra::distance(&atom.center, &center) + atom.radius)
        .fold(0.0, f64::max);
    Ok(BoundingSphere { center, radius })
}

/// Translates every atom center by `-offset`.
pub fn offset_atoms(atoms: &[AtomSphere], offset: &Vector3<f64>) -> Vec<AtomSphere> {
    atoms
        .iter()
        .map(|atom| AtomSphere::new(atom.center - offset, atom.radius))
        .collect()
}

pub fn convert_editor_position_to_engine(position: [f64; 3]) -> Point3<f64> {
    Point3::new(-position[0], position[1], position[2])
}

/// Static X-Y-Z Euler angles (radians) of a rotation matrix, such that
/// `m = Rz(z) · Ry(y) · Rx(x)`.
pub fn euler_from_matrix(m: &Matrix3<f64>) -> Vector3<f64> {
    let cy = (m[(0, 0)] * m[(0, 0)] + m[(1, 0)] * m[(1, 0)]).sqrt();
    if cy > EULER_EPSILON {
        Vector3::new(
            m[(2, 1)].atan2(m[(2, 2)]),
            (-m[(2, 0)]).atan2(cy),
            m[(1, 0)].atan2(m[(0, 0)]),
        )
    } else {
        Vector3::new((-m[(1, 2)]).atan2(m[(1, 1)]), (-m[(2, 0)]).atan2(cy), 0.0)
    }
}

/// Recomposes static X-Y-Z Euler angles as `qz · qy · qx`.
pub fn rotation_from_euler(angles: &Vector3<f64>) -> UnitQuaternion<f64> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z);
    qz * qy * qx
}

/// Converts an editor-convention rotation matrix into an engine quaternion.
///
/// Only the upper-left 3×3 block of a homogeneous matrix should be passed.
pub fn convert_editor_rotation_to_engine(matrix: &Matrix3<f64>) -> UnitQuaternion<f64> {
    let euler = euler_from_matrix(matrix);
    rotation_from_euler(&Vector3::new(euler.x, -euler.y, -euler.z))
}

/// Inverse of [`convert_editor_rotation_to_engine`].
pub fn convert_engine_rotation_to_editor(rotation: &UnitQuaternion<f64>) -> Matrix3<f64> {
    let mirror = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
    mirror * rotation.to_rotation_matrix().into_inner() * mirror
}

/// Rotation matrix of a recipe quaternion stored as `[x, y, z, w]`.
///
/// A near-zero quaternion yields the identity.
pub fn editor_quaternion_matrix(xyzw: [f64; 4]) -> Matrix3<f64> {
    let q = Quaternion::new(xyzw[3], xyzw[0], xyzw[1], xyzw[2]);
    if q.norm_squared() < EULER_EPSILON {
        return Matrix3::identity();
    }
    UnitQuaternion::from_quaternion(q)
        .to_rotation_matrix()
        .into_inner()
}

/// Converts a recipe quaternion (`[x, y, z, w]`, editor convention) into an
/// engine rotation through the same matrix path used for symmetry transforms.
pub fn convert_editor_quaternion_to_engine(xyzw: [f64; 4]) -> UnitQuaternion<f64> {
    convert_editor_rotation_to_engine(&editor_quaternion_matrix(xyzw))
}

pub fn transform_point(rotation: &UnitQuaternion<f64>, point: &Vector3<f64>) -> Vector3<f64> {
    rotation * point
}

/// One symmetry copy reduced to its engine-convention rotation and its
/// offset relative to the symmetry center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryCopy {
    pub rotation: UnitQuaternion<f64>,
    pub offset: Vector3<f64>,
}

/// Precomputed symmetry expansion for one structure.
///
/// Built once per structure and applied to every placement row, since the
/// per-copy rotations and offsets do not depend on the placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymmetryExpansion {
    copies: Vec<SymmetryCopy>,
    center: Vector3<f64>,
}

impl SymmetryExpansion {
    /// Prepares the copies of a structure whose raw (pre-centering) center is
    /// `structure_center`.
    pub fn new(transforms: &[Matrix4<f64>], structure_center: &Vector3<f64>) -> Self {
        let raw: Vec<SymmetryCopy> = transforms
            .iter()
            .map(|transform| {
                let rotation = convert_editor_rotation_to_engine(
                    &transform.fixed_view::<3, 3>(0, 0).into_owned(),
                );
                let translation = Vector3::new(
                    -transform[(0, 3)],
                    transform[(1, 3)],
                    transform[(2, 3)],
                );
                SymmetryCopy {
                    rotation,
                    offset: translation + transform_point(&rotation, structure_center),
                }
            })
            .collect();

        let center = box_center(raw.iter().map(|copy| copy.offset));
        let copies = raw
            .into_iter()
            .map(|copy| SymmetryCopy {
                rotation: copy.rotation,
                offset: copy.offset - center,
            })
            .collect();
        Self { copies, center }
    }

    /// Midpoint of the box spanned by every copy's offset; zero without copies.
    pub fn center(&self) -> Vector3<f64> {
        self.center
    }

    pub fn copies(&self) -> &[SymmetryCopy] {
        &self.copies
    }

    pub fn len(&self) -> usize {
        self.copies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Places every copy relative to one instance placement.
    pub fn expand(
        &self,
        position: &Point3<f64>,
        rotation: &UnitQuaternion<f64>,
    ) -> Vec<(Point3<f64>, UnitQuaternion<f64>)> {
        self.copies
            .iter()
            .map(|copy| (position + rotation * copy.offset, rotation * copy.rotation))
            .collect()
    }
}

fn box_center(points: impl Iterator<Item = Vector3<f64>>) -> Vector3<f64> {
    let mut bounds: Option<(Vector3<f64>, Vector3<f64>)> = None;
    for p in points {
        bounds = Some(match bounds {
            None => (p, p),
            Some((min, max)) => (min.inf(&p), max.sup(&p)),
        });
    }
    bounds.map_or_else(Vector3::zeros, |(min, max)| (min + max) * 0.5)
}

/// Symmetry center of a set of transforms applied to a structure center.
pub fn symmetry_center(transforms: &[Matrix4<f64>], structure_center: &Vector3<f64>) -> Vector3<f64> {
    SymmetryExpansion::new(transforms, structure_center).center()
}

/// One `(position, rotation)` per transform for a single instance placement.
pub fn expand_symmetry(
    transforms: &[Matrix4<f64>],
    structure_center: &Vector3<f64>,
    instance_position: &Point3<f64>,
    instance_rotation: &UnitQuaternion<f64>,
) -> Vec<(Point3<f64>, UnitQuaternion<f64>)> {
    SymmetryExpansion::new(transforms, structure_center).expand(instance_position, instance_rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn sphere(x: f64, y: f64, z: f64, r: f64) -> AtomSphere {
        AtomSphere::new(Point3::new(x, y, z), r)
    }

    fn assert_matrix_close(a: &Matrix3<f64>, b: &Matrix3<f64>, tol: f64) {
        assert!((a - b).abs().max() < tol, "matrices differ:\n{a}\n{b}");
    }

    fn homogeneous(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Matrix4<f64> {
        let mut m = rotation.to_homogeneous();
        m[(0, 3)] = translation.x;
        m[(1, 3)] = translation.y;
        m[(2, 3)] = translation.z;
        m
    }

    #[test]
    fn bounding_sphere_of_two_atoms() {
        let bounds =
            compute_bounding_sphere(&[sphere(0.0, 0.0, 0.0, 1.0), sphere(2.0, 0.0, 0.0, 1.0)])
                .unwrap();
        assert!((bounds.center - Point3::new(1.0, 0.0, 0.0)).norm() < EPS);
        assert!((bounds.radius - 2.0).abs() < EPS);
    }

    #[test]
    fn bounding_sphere_of_empty_input_fails() {
        assert_eq!(compute_bounding_sphere(&[]), Err(GeometryError::EmptyInput));
    }

    #[test]
    fn bounding_sphere_contains_every_atom() {
        let mut rng = StdRng::seed_from_u64(42);
        let atoms: Vec<AtomSphere> = (0..200)
            .map(|_| {
                sphere(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(0.0..3.0),
                )
            })
            .collect();
        let bounds = compute_bounding_sphere(&atoms).unwrap();
        for atom in &atoms {
            assert!(nalgebra::distance(&atom.center, &bounds.center) + atom.radius <= bounds.radius + EPS);
        }
    }

    #[test]
    fn recentering_is_idempotent() {
        let atoms = vec![
            sphere(10.0, 4.0, -3.0, 1.2),
            sphere(12.0, 9.0, 1.0, 1.7),
            sphere(7.0, 5.5, 0.0, 1.5),
        ];
        let first = compute_bounding_sphere(&atoms).unwrap();
        let centered = offset_atoms(&atoms, &first.center.coords);

        let second = compute_bounding_sphere(&centered).unwrap();
        assert!(second.center.coords.norm() < EPS);
        assert!((second.radius - first.radius).abs() < EPS);

        let again = offset_atoms(&centered, &second.center.coords);
        for (a, b) in centered.iter().zip(&again) {
            assert!((a.center - b.center).norm() < EPS);
        }
    }

    #[test]
    fn euler_decomposition_recomposes_the_matrix() {
        let angles = Vector3::new(0.3, -0.7, 1.9);
        let matrix = rotation_from_euler(&angles).to_rotation_matrix().into_inner();
        let extracted = euler_from_matrix(&matrix);
        assert!((extracted - angles).norm() < 1e-9);
    }

    #[test]
    fn euler_decomposition_handles_gimbal_lock() {
        let matrix = Rotation3::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2).into_inner();
        let extracted = euler_from_matrix(&matrix);
        let recomposed = rotation_from_euler(&extracted).to_rotation_matrix().into_inner();
        assert_matrix_close(&recomposed, &matrix, 1e-9);
    }

    #[test]
    fn conversion_mirrors_across_the_x_axis() {
        let about_x = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.4).into_inner();
        let converted = convert_editor_rotation_to_engine(&about_x);
        assert!(converted.angle_to(&UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.4)) < 1e-9);

        let about_y = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.4).into_inner();
        let converted = convert_editor_rotation_to_engine(&about_y);
        assert!(converted.angle_to(&UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -0.4)) < 1e-9);
    }

    #[test]
    fn conversion_round_trips_random_rotations() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let axis = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if axis.norm() < 1e-3 {
                continue;
            }
            let matrix = Rotation3::from_axis_angle(
                &nalgebra::Unit::new_normalize(axis),
                rng.gen_range(-3.1..3.1),
            )
            .into_inner();
            let engine = convert_editor_rotation_to_engine(&matrix);
            assert_matrix_close(&convert_engine_rotation_to_editor(&engine), &matrix, 1e-9);
        }
    }

    #[test]
    fn rotation_conversion_agrees_with_position_mirroring() {
        let matrix = Rotation3::from_euler_angles(0.2, 0.5, -1.1).into_inner();
        let engine = convert_editor_rotation_to_engine(&matrix);
        let p = [1.5, -2.0, 3.0];

        let rotated_then_mirrored = convert_editor_position_to_engine((matrix * Vector3::from(p)).into());
        let mirrored_then_rotated = engine * convert_editor_position_to_engine(p);
        assert!((rotated_then_mirrored - mirrored_then_rotated).norm() < 1e-9);
    }

    #[test]
    fn identity_quaternion_and_zero_quaternion_map_to_identity() {
        let identity = convert_editor_quaternion_to_engine([0.0, 0.0, 0.0, 1.0]);
        assert!(identity.angle() < EPS);
        let degenerate = convert_editor_quaternion_to_engine([0.0, 0.0, 0.0, 0.0]);
        assert!(degenerate.angle() < EPS);
    }

    #[test]
    fn symmetry_expansion_yields_one_copy_per_transform() {
        let transforms = vec![
            Matrix4::identity(),
            homogeneous(
                Rotation3::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2).into_inner(),
                Vector3::new(10.0, 0.0, 0.0),
            ),
            homogeneous(Matrix3::identity(), Vector3::new(0.0, 5.0, 0.0)),
        ];
        let placed = expand_symmetry(
            &transforms,
            &Vector3::zeros(),
            &Point3::origin(),
            &UnitQuaternion::identity(),
        );
        assert_eq!(placed.len(), 3);
    }

    #[test]
    fn symmetry_translation_negates_x_and_is_centered() {
        let transforms = vec![
            homogeneous(Matrix3::identity(), Vector3::new(10.0, 0.0, 0.0)),
            homogeneous(Matrix3::identity(), Vector3::new(20.0, 4.0, 0.0)),
        ];
        let expansion = SymmetryExpansion::new(&transforms, &Vector3::zeros());
        assert!((expansion.center() - Vector3::new(-15.0, 2.0, 0.0)).norm() < EPS);

        let placed = expansion.expand(&Point3::new(1.0, 1.0, 1.0), &UnitQuaternion::identity());
        assert!((placed[0].0 - Point3::new(1.0 + 5.0, 1.0 - 2.0, 1.0)).norm() < EPS);
        assert!((placed[1].0 - Point3::new(1.0 - 5.0, 1.0 + 2.0, 1.0)).norm() < EPS);
    }

    #[test]
    fn symmetry_copies_compose_with_instance_rotation() {
        let copy_rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.6).into_inner();
        let transforms = vec![homogeneous(copy_rotation, Vector3::zeros())];
        let instance_rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.25);

        let placed = expand_symmetry(
            &transforms,
            &Vector3::new(3.0, 0.0, 0.0),
            &Point3::origin(),
            &instance_rotation,
        );
        let expected = instance_rotation * convert_editor_rotation_to_engine(&copy_rotation);
        assert!(placed[0].1.angle_to(&expected) < 1e-9);
        // A single copy sits exactly on the symmetry center.
        assert!(placed[0].0.coords.norm() < EPS);
    }

    #[test]
    fn symmetry_center_is_zero_without_transforms() {
        assert_eq!(symmetry_center(&[], &Vector3::new(1.0, 2.0, 3.0)), Vector3::zeros());
    }
}
