use super::bucket::BucketDescriptor;
use crate::core::models::instance::{CurveInstance, PlacedInstance};
use crate::core::models::structure::StructureDefinition;

/// Receives everything a load produces.
///
/// Calls arrive in traversal order. For a given path `register_structure`
/// precedes every `add_instance`, and `finalize_counts` follows each batch of
/// instances with the running totals for that path.
pub trait SceneSink {
    /// A new bucket is about to be walked.
    fn begin_bucket(&mut self, _bucket: &BucketDescriptor) {}

    fn register_structure(&mut self, definition: StructureDefinition);

    fn add_instance(&mut self, instance: PlacedInstance);

    fn register_curve_structure(&mut self, path: &str, label: &str);

    fn add_curve_instance(&mut self, instance: CurveInstance);

    /// Atom count of one copy and total instances placed so far for `path`.
    fn finalize_counts(&mut self, path: &str, atom_count: usize, instance_count: usize);
}

impl<K: SceneSink + ?Sized> SceneSink for &mut K {
    fn begin_bucket(&mut self, bucket: &BucketDescriptor) {
        (**self).begin_bucket(bucket)
    }

    fn register_structure(&mut self, definition: StructureDefinition) {
        (**self).register_structure(definition)
    }

    fn add_instance(&mut self, instance: PlacedInstance) {
        (**self).add_instance(instance)
    }

    fn register_curve_structure(&mut self, path: &str, label: &str) {
        (**self).register_curve_structure(path, label)
    }

    fn add_curve_instance(&mut self, instance: CurveInstance) {
        (**self).add_curve_instance(instance)
    }

    fn finalize_counts(&mut self, path: &str, atom_count: usize, instance_count: usize) {
        (**self).finalize_counts(path, atom_count, instance_count)
    }
}
