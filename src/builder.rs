use tracing::warn;

use crate::atom::{Atom, Radical};
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::element::Element;
use crate::error::MoleculeError;
use crate::molecule::Molecule;

impl Molecule {
    /// Starts an atom builder. Atoms can only enter a molecule this
    /// way.
    pub fn new_atom_builder(&mut self) -> AtomBuilder<'_> {
        AtomBuilder { mol: self, atom: None }
    }

    /// Starts a bond builder. Bonds can only enter a molecule this
    /// way.
    pub fn new_bond_builder(&mut self) -> BondBuilder<'_> {
        BondBuilder { mol: self, bond: None }
    }
}

/// Builds an atom one property at a time and attaches it to its
/// molecule on [`build`](Self::build).
///
/// Input ids must arrive strictly in sequence (dense, 1-based); an
/// out-of-order id is how a scrambled connection table announces
/// itself, and it is rejected immediately.
#[derive(Debug)]
pub struct AtomBuilder<'m> {
    mol: &'m mut Molecule,
    atom: Option<Atom>,
}

impl<'m> AtomBuilder<'m> {
    /// Begins a new atom of the given element, with the given input
    /// id. Fails if the symbol is unknown or the id is not the next
    /// expected one.
    pub fn new(mut self, symbol: &str, iid: u16) -> Result<Self, MoleculeError> {
        let expected = self.mol.next_atom_iid();
        if iid != expected {
            return Err(MoleculeError::InputSequence {
                kind: "atom",
                expected,
                given: iid,
            });
        }
        let element = Element::from_symbol(symbol).ok_or_else(|| MoleculeError::UnknownElement {
            symbol: symbol.to_owned(),
        })?;
        self.atom = Some(Atom::new(element, iid));
        Ok(self)
    }

    pub fn coordinates(mut self, x: f32, y: f32, z: f32) -> Self {
        if let Some(a) = self.atom.as_mut() {
            a.x = x;
            a.y = y;
            a.z = z;
        }
        self
    }

    /// Decodes a connection-table charge code: 1..=3 map to +3..+1,
    /// 4 marks a doublet radical, 5..=7 map to −1..−3, anything else
    /// means neutral.
    pub fn charge(mut self, code: u8) -> Self {
        if let Some(a) = self.atom.as_mut() {
            match code {
                1 => a.charge = 3,
                2 => a.charge = 2,
                3 => a.charge = 1,
                4 => a.radical = Radical::Doublet,
                5 => a.charge = -1,
                6 => a.charge = -2,
                7 => a.charge = -3,
                _ => a.charge = 0,
            }
        }
        self
    }

    /// Overrides the element's default valence. Values outside
    /// 1..=14 are ignored.
    pub fn valence(mut self, v: i8) -> Self {
        if let Some(a) = self.atom.as_mut() {
            if v > 0 && v < 15 {
                a.valence = v;
            }
        }
        self
    }

    pub fn radical(mut self, r: Radical) -> Self {
        if let Some(a) = self.atom.as_mut() {
            a.radical = r;
        }
        self
    }

    /// Records an isotope symbol distinct from the element default.
    pub fn isotope(mut self, symbol: &str) -> Self {
        if let Some(a) = self.atom.as_mut() {
            a.isotope = Some(symbol.to_owned());
        }
        self
    }

    /// Finalizes the record and attaches it to the molecule,
    /// answering the atom's input id.
    pub fn build(self) -> Result<u16, MoleculeError> {
        let atom = self.atom.ok_or_else(|| MoleculeError::Internal {
            mol_id: self.mol.id(),
            detail: "atom builder used before new()".into(),
        })?;
        self.mol.attach_atom(atom)
    }
}

/// Builds a bond one property at a time and attaches it to its
/// molecule on [`build`](Self::build).
///
/// A bond with a hydrogen endpoint is never materialised: the heavy
/// endpoint's hydrogen count is bumped instead and
/// [`atoms`](Self::atoms) answers the non-fatal
/// [`MoleculeError::HydrogenBond`].
#[derive(Debug)]
pub struct BondBuilder<'m> {
    mol: &'m mut Molecule,
    bond: Option<Bond>,
}

impl<'m> BondBuilder<'m> {
    /// Begins a new bond with the given id, which must be the next
    /// expected one.
    pub fn new(mut self, bid: u16) -> Result<Self, MoleculeError> {
        let expected = self.mol.next_bond_id();
        if bid != expected {
            return Err(MoleculeError::InputSequence {
                kind: "bond",
                expected,
                given: bid,
            });
        }
        self.bond = Some(Bond::new(bid, 0, 0, BondOrder::Single, BondStereo::None));
        Ok(self)
    }

    /// Sets the input ids of the two atoms being bound. Both must
    /// exist in the molecule. If either endpoint is a hydrogen, the
    /// bond is dropped, the heavy endpoint's hydrogen count is
    /// incremented, and the non-fatal `HydrogenBond` error is
    /// answered.
    pub fn atoms(mut self, aiid1: u16, aiid2: u16) -> Result<Self, MoleculeError> {
        let bond = self.bond.as_mut().ok_or_else(|| MoleculeError::Internal {
            mol_id: self.mol.id(),
            detail: "bond builder used before new()".into(),
        })?;
        let bid = bond.id;

        for aiid in [aiid1, aiid2] {
            if !self.mol.has_iid(aiid) {
                return Err(MoleculeError::InvalidBond {
                    bond_id: bid,
                    reason: format!("unknown atom input id {}", aiid),
                });
            }
        }

        let h1 = self.mol.is_hydrogen_iid(aiid1);
        let h2 = self.mol.is_hydrogen_iid(aiid2);
        if h1 || h2 {
            if h1 && !h2 {
                self.mol.fold_hydrogen_into(aiid2);
            } else if h2 && !h1 {
                self.mol.fold_hydrogen_into(aiid1);
            }
            warn!(bond_id = bid, a1 = aiid1, a2 = aiid2, "dropping hydrogen-bearing bond");
            self.mol.retire_bond_id();
            return Err(MoleculeError::HydrogenBond { bond_id: bid });
        }

        bond.a1 = aiid1;
        bond.a2 = aiid2;
        Ok(self)
    }

    pub fn order(mut self, order: BondOrder) -> Self {
        if let Some(b) = self.bond.as_mut() {
            b.order = order;
        }
        self
    }

    /// Decodes and sets a connection-table order code; `none` and
    /// `alternating` are rejected here.
    pub fn order_code(mut self, code: u8) -> Result<Self, MoleculeError> {
        let bid = self.bond.as_ref().map(|b| b.id).unwrap_or(0);
        let order = BondOrder::from_code(code).map_err(|e| match e {
            MoleculeError::InvalidBond { reason, .. } => {
                MoleculeError::InvalidBond { bond_id: bid, reason }
            }
            other => other,
        })?;
        if let Some(b) = self.bond.as_mut() {
            b.order = order;
        }
        Ok(self)
    }

    pub fn stereo(mut self, stereo: BondStereo) -> Self {
        if let Some(b) = self.bond.as_mut() {
            b.stereo = stereo;
        }
        self
    }

    pub fn stereo_code(mut self, code: u8) -> Result<Self, MoleculeError> {
        let bid = self.bond.as_ref().map(|b| b.id).unwrap_or(0);
        let stereo = BondStereo::from_code(code).map_err(|e| match e {
            MoleculeError::InvalidBond { reason, .. } => {
                MoleculeError::InvalidBond { bond_id: bid, reason }
            }
            other => other,
        })?;
        if let Some(b) = self.bond.as_mut() {
            b.stereo = stereo;
        }
        Ok(self)
    }

    /// Finalizes the record and attaches it to the molecule,
    /// answering the bond id.
    pub fn build(self) -> Result<u16, MoleculeError> {
        let bond = self.bond.ok_or_else(|| MoleculeError::Internal {
            mol_id: self.mol.id(),
            detail: "bond builder used before new()".into(),
        })?;
        if bond.a1 == 0 || bond.a2 == 0 {
            return Err(MoleculeError::InvalidBond {
                bond_id: bond.id,
                reason: "bond endpoints were never set".into(),
            });
        }
        self.mol.attach_bond(bond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_ids_must_be_sequential() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        let err = mol.new_atom_builder().new("C", 3).unwrap_err();
        assert!(matches!(
            err,
            MoleculeError::InputSequence { kind: "atom", expected: 2, given: 3 }
        ));
    }

    #[test]
    fn unknown_symbol_is_rejected() {
        let mut mol = Molecule::new();
        let err = mol.new_atom_builder().new("Xx", 1).unwrap_err();
        assert!(matches!(err, MoleculeError::UnknownElement { .. }));
    }

    #[test]
    fn charge_codes_decode() {
        let mut mol = Molecule::new();
        for (code, charge) in [(1u8, 3i8), (2, 2), (3, 1), (5, -1), (6, -2), (7, -3), (0, 0)] {
            let iid = mol.next_atom_iid();
            mol.new_atom_builder()
                .new("C", iid)
                .unwrap()
                .charge(code)
                .build()
                .unwrap();
            assert_eq!(mol.atom_with_iid(iid).unwrap().charge(), charge);
        }
    }

    #[test]
    fn charge_code_four_is_doublet_radical() {
        let mut mol = Molecule::new();
        mol.new_atom_builder()
            .new("C", 1)
            .unwrap()
            .charge(4)
            .build()
            .unwrap();
        let a = mol.atom_with_iid(1).unwrap();
        assert_eq!(a.charge(), 0);
        assert_eq!(a.radical(), Radical::Doublet);
    }

    #[test]
    fn valence_override_bounds() {
        let mut mol = Molecule::new();
        mol.new_atom_builder()
            .new("S", 1)
            .unwrap()
            .valence(6)
            .build()
            .unwrap();
        mol.new_atom_builder()
            .new("S", 2)
            .unwrap()
            .valence(20)
            .build()
            .unwrap();
        assert_eq!(mol.atom_with_iid(1).unwrap().valence(), 6);
        assert_eq!(mol.atom_with_iid(2).unwrap().valence(), 2);
    }

    #[test]
    fn bond_ids_must_be_sequential() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("C", 2).unwrap().build().unwrap();
        let err = mol.new_bond_builder().new(2).unwrap_err();
        assert!(matches!(
            err,
            MoleculeError::InputSequence { kind: "bond", expected: 1, given: 2 }
        ));
    }

    #[test]
    fn bond_to_unknown_atom_is_rejected() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        let err = mol.new_bond_builder().new(1).unwrap().atoms(1, 9).unwrap_err();
        assert!(matches!(err, MoleculeError::InvalidBond { .. }));
    }

    #[test]
    fn hydrogen_bond_folds_into_heavy_endpoint() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("H", 2).unwrap().build().unwrap();
        mol.new_atom_builder().new("O", 3).unwrap().build().unwrap();

        let err = mol.new_bond_builder().new(1).unwrap().atoms(1, 2).unwrap_err();
        assert!(matches!(err, MoleculeError::HydrogenBond { bond_id: 1 }));
        assert_eq!(mol.atom_with_iid(1).unwrap().hydrogen_count(), 1);

        // The dropped bond consumed id 1; the C-O bond comes next.
        mol.new_bond_builder()
            .new(2)
            .unwrap()
            .atoms(1, 3)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap();
        assert_eq!(mol.bond_count(), 1);
        assert!(mol.bond_between(1, 3).is_some());
    }

    #[test]
    fn hydrogen_atoms_never_materialise() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("H", 2).unwrap().build().unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert!(mol.atom_with_iid(2).is_none());
    }

    #[test]
    fn duplicate_bond_is_rejected() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("C", 2).unwrap().build().unwrap();
        mol.new_bond_builder()
            .new(1)
            .unwrap()
            .atoms(1, 2)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap();
        let err = mol
            .new_bond_builder()
            .new(2)
            .unwrap()
            .atoms(2, 1)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap_err();
        assert!(matches!(err, MoleculeError::InvalidBond { .. }));
    }

    #[test]
    fn bond_order_codes_reject_none_and_alternating() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("C", 2).unwrap().build().unwrap();
        let bb = mol.new_bond_builder().new(1).unwrap().atoms(1, 2).unwrap();
        assert!(bb.order_code(4).is_err());
    }

    #[test]
    fn bond_stereo_codes_decode() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("C", 2).unwrap().build().unwrap();
        mol.new_bond_builder()
            .new(1)
            .unwrap()
            .atoms(1, 2)
            .unwrap()
            .order(BondOrder::Single)
            .stereo_code(1)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(mol.bond_with_id(1).unwrap().stereo(), BondStereo::Up);
    }

    #[test]
    fn expanded_neighbors_respect_bond_order() {
        let mut mol = Molecule::new();
        mol.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol.new_atom_builder().new("O", 2).unwrap().build().unwrap();
        mol.new_atom_builder().new("C", 3).unwrap().build().unwrap();
        mol.new_bond_builder()
            .new(1)
            .unwrap()
            .atoms(1, 2)
            .unwrap()
            .order(BondOrder::Double)
            .build()
            .unwrap();
        mol.new_bond_builder()
            .new(2)
            .unwrap()
            .atoms(1, 3)
            .unwrap()
            .order(BondOrder::Single)
            .build()
            .unwrap();

        let c = mol.atom_with_iid(1).unwrap();
        assert_eq!(c.neighbors(), &[2, 2, 3]);
        assert_eq!(c.single_bond_count(), 1);
        assert_eq!(c.double_bond_count(), 1);
        assert_eq!(c.degree(), 2);
    }
}
