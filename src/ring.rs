use bit_set::BitSet;

use crate::error::MoleculeError;
use crate::molecule::Molecule;

/// A simple cycle in a molecule.
///
/// A ring holds the atoms and bonds it comprises, in cyclic order,
/// and knows its neighbouring rings. Once completed, a ring's
/// composition never changes.
///
/// The atom ids held by rings are input ids, to match those held by
/// bonds; that keeps atoms and bonds directly usable together during
/// ring detection.
#[derive(Debug, Clone)]
pub struct Ring {
    pub(crate) id: u8,
    /// Id of the ring system this ring belongs to.
    pub(crate) rs_id: u8,

    pub(crate) atoms: Vec<u16>,
    pub(crate) bonds: Vec<u16>,
    /// Ids of rings sharing at least one atom with this one.
    pub(crate) nbrs: Vec<u8>,

    pub(crate) atom_set: BitSet,
    pub(crate) bond_set: BitSet,

    pub(crate) is_aro: bool,
    pub(crate) is_het_aro: bool,

    pub(crate) is_complete: bool,
}

impl Ring {
    pub(crate) fn new(id: u8) -> Ring {
        Ring {
            id,
            rs_id: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            nbrs: Vec::new(),
            atom_set: BitSet::default(),
            bond_set: BitSet::default(),
            is_aro: false,
            is_het_aro: false,
            is_complete: false,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn ring_system_id(&self) -> u8 {
        self.rs_id
    }

    /// Number of atoms (equivalently, bonds) in this ring.
    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    /// Atom input ids in cyclic order.
    pub fn atoms(&self) -> &[u16] {
        &self.atoms
    }

    /// Bond ids in cyclic order; bond `i` joins atom `i` to atom
    /// `i + 1`, the last bond closing back to the first atom.
    pub fn bonds(&self) -> &[u16] {
        &self.bonds
    }

    /// Ids of rings sharing at least one atom with this one.
    pub fn neighbor_ids(&self) -> &[u8] {
        &self.nbrs
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_aromatic(&self) -> bool {
        self.is_aro
    }

    /// Aromatic with at least one non-carbon member.
    pub fn is_hetero_aromatic(&self) -> bool {
        self.is_het_aro
    }

    pub fn has_atom(&self, aiid: u16) -> bool {
        self.atom_set.contains(aiid as usize)
    }

    pub fn has_bond(&self, bid: u16) -> bool {
        self.bond_set.contains(bid as usize)
    }

    /// Index of the given atom in the cyclic sequence, `None` if it
    /// is not a member. The answer changes if the ring is rotated
    /// into canonical form in between calls.
    pub fn atom_index(&self, aiid: u16) -> Option<usize> {
        self.atoms.iter().position(|&a| a == aiid)
    }

    /// Adds the given atom, which must be bonded to the most recently
    /// added one. Idempotent: a member atom is ignored.
    pub(crate) fn add_atom(&mut self, mol: &Molecule, aiid: u16) -> Result<(), MoleculeError> {
        if self.is_complete {
            return Err(MoleculeError::RingInvariant {
                ring_id: self.id,
                reason: "ring is already complete".into(),
            });
        }
        if self.has_atom(aiid) {
            return Ok(());
        }

        if let Some(&prev) = self.atoms.last() {
            let bond = mol.bond_between(prev, aiid).ok_or_else(|| {
                MoleculeError::RingInvariant {
                    ring_id: self.id,
                    reason: format!("no bond between atom {} and atom {}", prev, aiid),
                }
            })?;
            self.bonds.push(bond.id);
            self.bond_set.insert(bond.id as usize);
        }
        self.atoms.push(aiid);
        self.atom_set.insert(aiid as usize);
        Ok(())
    }

    /// Closes the link between the last atom and the first, freezing
    /// the ring. Idempotent.
    pub(crate) fn complete(&mut self, mol: &Molecule) -> Result<(), MoleculeError> {
        if self.is_complete {
            return Ok(());
        }

        let size = self.atoms.len();
        if size < 3 {
            return Err(MoleculeError::RingInvariant {
                ring_id: self.id,
                reason: format!("a ring must have at least 3 atoms, this one has {}", size),
            });
        }

        let first = self.atoms[0];
        let last = self.atoms[size - 1];
        let bond = mol
            .bond_between(first, last)
            .ok_or_else(|| MoleculeError::RingInvariant {
                ring_id: self.id,
                reason: format!("no closing bond between atom {} and atom {}", first, last),
            })?;
        self.bonds.push(bond.id);
        self.bond_set.insert(bond.id as usize);

        self.is_complete = true;
        Ok(())
    }

    /// Rotates the ring into canonical form: the atom with the lowest
    /// normalized id comes first, and the cycle runs in the direction
    /// in which the second atom has the smaller normalized id. The
    /// bond sequence is rebuilt to match.
    pub(crate) fn canonicalize(&mut self, mol: &Molecule) -> Result<(), MoleculeError> {
        let len = self.atoms.len();
        if len == 0 {
            return Err(MoleculeError::RingInvariant {
                ring_id: self.id,
                reason: "cannot canonicalize an empty ring".into(),
            });
        }

        let nid = |aiid: u16| mol.atom_with_iid(aiid).map(|a| a.nid).unwrap_or(u16::MAX);

        let min_pos = (0..len)
            .min_by_key(|&i| nid(self.atoms[i]))
            .unwrap_or(0);
        self.atoms.rotate_left(min_pos);

        if len > 2 && nid(self.atoms[1]) > nid(self.atoms[len - 1]) {
            self.atoms[1..].reverse();
        }

        self.bonds.clear();
        for i in 0..len {
            let a = self.atoms[i];
            let b = self.atoms[(i + 1) % len];
            let bond = mol
                .bond_between(a, b)
                .ok_or_else(|| MoleculeError::RingInvariant {
                    ring_id: self.id,
                    reason: format!("no bond between ring atoms {} and {}", a, b),
                })?;
            self.bonds.push(bond.id);
        }
        Ok(())
    }

    /// Atoms participating in both this ring and the other.
    pub fn common_atoms(&self, other: &Ring) -> BitSet {
        let mut set = self.atom_set.clone();
        set.intersect_with(&other.atom_set);
        set
    }

    /// Bonds participating in both this ring and the other.
    pub fn common_bonds(&self, other: &Ring) -> BitSet {
        let mut set = self.bond_set.clone();
        set.intersect_with(&other.bond_set);
        set
    }

    /// The shorter in-ring distance between two member atoms.
    pub fn distance_between_atoms(&self, aiid1: u16, aiid2: u16) -> Result<usize, MoleculeError> {
        let i1 = self.atom_index(aiid1).ok_or_else(|| MoleculeError::RingInvariant {
            ring_id: self.id,
            reason: format!("atom {} is not a member of this ring", aiid1),
        })?;
        let i2 = self.atom_index(aiid2).ok_or_else(|| MoleculeError::RingInvariant {
            ring_id: self.id,
            reason: format!("atom {} is not a member of this ring", aiid2),
        })?;

        let d1 = i1.abs_diff(i2);
        let d2 = self.size() - d1;
        Ok(d1.min(d2))
    }

    /// Total delocalised pi electrons contributed by the member
    /// atoms; `None` when some member disqualifies the ring from
    /// aromaticity outright.
    pub fn pi_electron_count(&self, mol: &Molecule) -> Option<u32> {
        let mut total = 0u32;
        for &aiid in &self.atoms {
            total += u32::from(crate::unsaturation::pi_electron_contribution(mol, aiid)?);
        }
        Some(total)
    }
}

/// A maximal set of rings connected by shared atoms: fused (sharing
/// at least one bond) or spiro-joined (sharing exactly one atom),
/// transitively.
#[derive(Debug, Clone)]
pub struct RingSystem {
    pub(crate) id: u8,

    pub(crate) rings: Vec<u8>,
    /// Union of the atoms of all member rings.
    pub(crate) atom_set: BitSet,
    /// Union of the bonds of all member rings.
    pub(crate) bond_set: BitSet,

    pub(crate) is_aro: bool,
}

impl RingSystem {
    pub(crate) fn new(id: u8) -> RingSystem {
        RingSystem {
            id,
            rings: Vec::new(),
            atom_set: BitSet::default(),
            bond_set: BitSet::default(),
            is_aro: false,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Number of rings in this system.
    pub fn size(&self) -> usize {
        self.rings.len()
    }

    pub fn ring_ids(&self) -> &[u8] {
        &self.rings
    }

    pub fn has_ring(&self, rid: u8) -> bool {
        self.rings.contains(&rid)
    }

    /// Is this ring system aromatic as a whole?
    pub fn is_aromatic(&self) -> bool {
        self.is_aro
    }

    /// Input ids of all atoms across the member rings.
    pub fn atom_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.atom_set.iter().map(|a| a as u16)
    }

    /// Ids of all bonds across the member rings.
    pub fn bond_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.bond_set.iter().map(|b| b as u16)
    }

    /// Adds the given ring to this system. The ring must share at
    /// least one atom or bond with the current members (the first
    /// ring is accepted unconditionally). Idempotent.
    pub(crate) fn add_ring(&mut self, ring: &Ring) -> Result<(), MoleculeError> {
        if self.rings.contains(&ring.id) {
            return Ok(());
        }

        if !self.rings.is_empty()
            && self.bond_set.intersection(&ring.bond_set).next().is_none()
            && self.atom_set.intersection(&ring.atom_set).next().is_none()
        {
            return Err(MoleculeError::RingInvariant {
                ring_id: ring.id,
                reason: format!(
                    "ring shares no atoms or bonds with ring system {}",
                    self.id
                ),
            });
        }

        self.rings.push(ring.id);
        self.atom_set.union_with(&ring.atom_set);
        self.bond_set.union_with(&ring.bond_set);
        Ok(())
    }

    /// Total delocalised pi electrons over all atoms of the system;
    /// `None` when some member atom rules aromaticity out.
    pub fn pi_electron_count(&self, mol: &Molecule) -> Option<u32> {
        let mut total = 0u32;
        for aiid in self.atom_ids() {
            total += u32::from(crate::unsaturation::pi_electron_contribution(mol, aiid)?);
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_with_atoms(id: u8, atoms: &[u16]) -> Ring {
        let mut r = Ring::new(id);
        for &a in atoms {
            r.atoms.push(a);
            r.atom_set.insert(a as usize);
        }
        r
    }

    #[test]
    fn common_atoms_of_fused_pair() {
        let r1 = ring_with_atoms(1, &[1, 2, 3, 4, 5, 6]);
        let r2 = ring_with_atoms(2, &[5, 6, 7, 8, 9, 10]);
        let shared = r1.common_atoms(&r2);
        assert_eq!(shared.len(), 2);
        assert!(shared.contains(5));
        assert!(shared.contains(6));
    }

    #[test]
    fn distance_takes_shorter_arc() {
        let r = ring_with_atoms(1, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(r.distance_between_atoms(1, 2).unwrap(), 1);
        assert_eq!(r.distance_between_atoms(1, 4).unwrap(), 3);
        assert_eq!(r.distance_between_atoms(1, 6).unwrap(), 1);
        assert!(r.distance_between_atoms(1, 9).is_err());
    }

    #[test]
    fn ring_system_add_ring_is_idempotent() {
        let r1 = ring_with_atoms(1, &[1, 2, 3, 4, 5, 6]);
        let mut rs = RingSystem::new(1);
        rs.add_ring(&r1).unwrap();
        rs.add_ring(&r1).unwrap();
        assert_eq!(rs.size(), 1);
        assert_eq!(rs.atom_set.len(), 6);
    }

    #[test]
    fn ring_system_rejects_disjoint_ring() {
        let r1 = ring_with_atoms(1, &[1, 2, 3, 4, 5, 6]);
        let r2 = ring_with_atoms(2, &[7, 8, 9]);
        let mut rs = RingSystem::new(1);
        rs.add_ring(&r1).unwrap();
        assert!(rs.add_ring(&r2).is_err());
    }

    #[test]
    fn ring_system_accepts_spiro_ring() {
        let r1 = ring_with_atoms(1, &[1, 2, 3, 4, 5]);
        let r2 = ring_with_atoms(2, &[5, 6, 7, 8]);
        let mut rs = RingSystem::new(1);
        rs.add_ring(&r1).unwrap();
        rs.add_ring(&r2).unwrap();
        assert_eq!(rs.size(), 2);
        assert_eq!(rs.atom_set.len(), 8);
    }
}
