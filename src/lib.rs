//! Chemical graph core of a retrosynthesis toolkit.
//!
//! The crate turns a freshly parsed connection table into a fully
//! annotated, immutable molecule ready for reaction-rule matching:
//!
//! 1. atoms and bonds are fed in through the builders, which enforce
//!    dense 1-based ids and fold hydrogen-bearing bonds into the
//!    heavy endpoint's hydrogen count;
//! 2. [`Molecule::finalize`] runs the fixed pipeline — canonical
//!    atom numbering, ring and ring-system perception, unsaturation
//!    classification, Hückel aromaticity — after which the molecule
//!    never changes;
//! 3. reaction rules consume the lookup surface and the structural
//!    predicates.
//!
//! Parsing of on-disk formats, stereochemistry determination and the
//! retrosynthesis search itself are external collaborators; the core
//! exposes the graph and its invariants, the collaborators traverse
//! it.

pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod builder;
pub mod constants;
pub mod element;
pub mod error;
pub mod molecule;
mod normalize;
mod perception;
pub mod predicates;
pub mod ring;
pub mod unsaturation;

pub use atom::{Atom, Radical, Unsaturation};
pub use bond::{Bond, BondOrder, BondStereo};
pub use builder::{AtomBuilder, BondBuilder};
pub use element::{is_valid_oxidation_state, Element};
pub use error::MoleculeError;
pub use molecule::{Attribute, Molecule};
pub use ring::{Ring, RingSystem};
