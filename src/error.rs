use thiserror::Error;

/// Errors surfaced while building or finalizing a molecule.
///
/// [`HydrogenBond`](Self::HydrogenBond) is the only non-fatal variant:
/// the offending bond has already been folded into the heavy
/// endpoint's hydrogen count, and the caller may continue feeding
/// records. Every other variant leaves the molecule unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoleculeError {
    #[error("out-of-sequence input: expected {kind} id {expected}, got {given}")]
    InputSequence {
        kind: &'static str,
        expected: u16,
        given: u16,
    },

    #[error("unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },

    #[error("invalid bond {bond_id}: {reason}")]
    InvalidBond { bond_id: u16, reason: String },

    #[error("bond {bond_id} involves a hydrogen endpoint; folded into hydrogen count")]
    HydrogenBond { bond_id: u16 },

    #[error("molecule {mol_id}: {count} rings exceed the cap of {cap}")]
    RingCapExceeded { mol_id: u64, count: usize, cap: usize },

    #[error("atom {iid} ({symbol}): oxidation state {state} is not permitted")]
    OxidationState {
        iid: u16,
        symbol: &'static str,
        state: i8,
    },

    #[error("ring {ring_id}: {reason}")]
    RingInvariant { ring_id: u8, reason: String },

    #[error("molecule {mol_id}: internal invariant violated: {detail}")]
    Internal { mol_id: u64, detail: String },
}
