use super::bucket::BucketDescriptor;
use super::sink::SceneSink;
use crate::core::models::ids::{CurveId, StructureId};
use crate::core::models::instance::{CurveInstance, PlacedInstance};
use crate::core::models::structure::StructureDefinition;
use nalgebra::{Point3, UnitQuaternion, Vector4};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;
use tracing::warn;

/// One placement of a stored structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredInstance {
    pub position: Point3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureCounts {
    pub atom_count: usize,
    pub instance_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveStructure {
    pub path: String,
    pub label: String,
    pub curves: Vec<Vec<Vector4<f64>>>,
}

/// In-memory [`SceneSink`] that keeps every structure, instance and curve.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    structures: SlotMap<StructureId, StructureDefinition>,
    instances: SecondaryMap<StructureId, Vec<StoredInstance>>,
    counts: SecondaryMap<StructureId, StructureCounts>,
    structure_by_path: HashMap<String, StructureId>,

    curves: SlotMap<CurveId, CurveStructure>,
    curve_by_path: HashMap<String, CurveId>,

    buckets: Vec<BucketDescriptor>,
    /// Registration position of every particle and curve path.
    order: HashMap<String, usize>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    pub fn curve_structure_count(&self) -> usize {
        self.curves.len()
    }

    pub fn structure_id(&self, path: &str) -> Option<StructureId> {
        self.structure_by_path.get(path).copied()
    }

    pub fn structure(&self, id: StructureId) -> Option<&StructureDefinition> {
        self.structures.get(id)
    }

    pub fn structure_by_path(&self, path: &str) -> Option<&StructureDefinition> {
        self.structure_id(path).and_then(|id| self.structure(id))
    }

    /// Structures in registration order.
    pub fn structures_iter(&self) -> impl Iterator<Item = (StructureId, &StructureDefinition)> {
        let mut entries: Vec<_> = self.structures.iter().collect();
        entries.sort_by_key(|(_, def)| self.registration_index(&def.path));
        entries.into_iter()
    }

    pub fn instances(&self, id: StructureId) -> &[StoredInstance] {
        self.instances.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn counts(&self, id: StructureId) -> StructureCounts {
        self.counts.get(id).copied().unwrap_or_default()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.values().map(Vec::len).sum()
    }

    /// Atoms summed over every placed instance.
    pub fn total_atom_count(&self) -> usize {
        self.structures
            .iter()
            .map(|(id, def)| def.atom_count() * self.instances(id).len())
            .sum()
    }

    pub fn curve_structure(&self, path: &str) -> Option<&CurveStructure> {
        self.curve_by_path
            .get(path)
            .and_then(|id| self.curves.get(*id))
    }

    /// Curve structures in registration order.
    pub fn curve_structures_iter(&self) -> impl Iterator<Item = &CurveStructure> {
        let mut entries: Vec<_> = self.curves.values().collect();
        entries.sort_by_key(|c| self.registration_index(&c.path));
        entries.into_iter()
    }

    pub fn curve_instance_count(&self) -> usize {
        self.curves.values().map(|c| c.curves.len()).sum()
    }

    pub fn buckets(&self) -> &[BucketDescriptor] {
        &self.buckets
    }

    fn registration_index(&self, path: &str) -> usize {
        self.order.get(path).copied().unwrap_or(usize::MAX)
    }
}

impl SceneSink for SceneStore {
    fn begin_bucket(&mut self, bucket: &BucketDescriptor) {
        self.buckets.push(bucket.clone());
    }

    fn register_structure(&mut self, definition: StructureDefinition) {
        if self.structure_by_path.contains_key(&definition.path) {
            warn!(path = %definition.path, "Structure registered twice; keeping the first definition.");
            return;
        }
        let path = definition.path.clone();
        let id = self.structures.insert(definition);
        self.instances.insert(id, Vec::new());
        self.counts.insert(id, StructureCounts::default());
        self.order.insert(path.clone(), self.order.len());
        self.structure_by_path.insert(path, id);
    }

    fn add_instance(&mut self, instance: PlacedInstance) {
        let Some(id) = self.structure_id(&instance.structure_path) else {
            warn!(path = %instance.structure_path, "Instance for unregistered structure dropped.");
            return;
        };
        if let Some(list) = self.instances.get_mut(id) {
            list.push(StoredInstance {
                position: instance.position,
                rotation: instance.rotation,
            });
        }
    }

    fn register_curve_structure(&mut self, path: &str, label: &str) {
        if self.curve_by_path.contains_key(path) {
            return;
        }
        let id = self.curves.insert(CurveStructure {
            path: path.to_string(),
            label: label.to_string(),
            curves: Vec::new(),
        });
        self.order.insert(path.to_string(), self.order.len());
        self.curve_by_path.insert(path.to_string(), id);
    }

    fn add_curve_instance(&mut self, instance: CurveInstance) {
        let Some(curve) = self
            .curve_by_path
            .get(&instance.structure_path)
            .and_then(|id| self.curves.get_mut(*id))
        else {
            warn!(path = %instance.structure_path, "Curve for unregistered structure dropped.");
            return;
        };
        curve.curves.push(instance.control_points);
    }

    fn finalize_counts(&mut self, path: &str, atom_count: usize, instance_count: usize) {
        if let Some(id) = self.structure_id(path) {
            self.counts.insert(
                id,
                StructureCounts {
                    atom_count,
                    instance_count,
                },
            );
        }
    }
}
