//! Hard caps on per-record set sizes.
//!
//! These bound the bit-sets embedded in atoms, bonds and rings.
//! Violating any of them is a fatal error while a molecule is being
//! built or finalized.

/// Maximum number of bonds an atom can have.
pub const MAX_BONDS: usize = 20;

/// Maximum number of rings an atom or bond can be a part of.
pub const MAX_RINGS: usize = 10;

/// Maximum number of functional-group features on an atom.
pub const MAX_FEATURES: usize = 10;
