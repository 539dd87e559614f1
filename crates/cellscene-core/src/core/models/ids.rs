use slotmap::new_key_type;

new_key_type! {
    /// Handle to a registered particle structure in a scene store.
    pub struct StructureId;
    /// Handle to a registered curve structure in a scene store.
    pub struct CurveId;
}
