use slotmap::new_key_type;

// Arena keys for the structure model. They are only meaningful for the
// `MolecularSystem` that issued them.
new_key_type! {
    pub struct AtomId;
    pub struct ResidueId;
    pub struct ChainId;
}
