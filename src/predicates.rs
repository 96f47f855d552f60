//! Structural predicates over a finalized molecule.
//!
//! Reaction rules query these instead of walking the graph
//! themselves. Purely local classifiers (`is_ch2`, `is_halogen`, …)
//! live directly on [`Atom`]; everything here needs the molecule for
//! partner or ring lookups.

use crate::atom::Atom;
use crate::bond::BondOrder;
use crate::error::MoleculeError;
use crate::molecule::Molecule;

/// A carbon with exactly one double bond, whose partner is an
/// oxygen.
pub fn is_carbonyl_c(mol: &Molecule, aiid: u16) -> bool {
    let Some(atom) = mol.atom_with_iid(aiid) else {
        return false;
    };
    if atom.atomic_num() != 6
        || atom.unsaturation() != crate::atom::Unsaturation::DoubleBondW
    {
        return false;
    }
    atom.bond_ids()
        .filter_map(|bid| mol.bond_with_id(bid))
        .filter(|b| b.order() == BondOrder::Double)
        .filter_map(|b| mol.atom_with_iid(b.other_atom(aiid)))
        .any(|partner| partner.atomic_num() == 8)
}

/// Part of an aromatic environment that includes at least one
/// heteroatom: either this atom is a non-carbon member of an
/// aromatic ring or system, or one of its rings is individually
/// hetero-aromatic.
pub fn in_hetero_aromatic_ring(mol: &Molecule, aiid: u16) -> bool {
    let Some(atom) = mol.atom_with_iid(aiid) else {
        return false;
    };
    if atom.is_in_aromatic_ring() && atom.atomic_num() != 6 {
        return true;
    }
    if atom
        .ring_ids()
        .filter_map(|rid| mol.ring_with_id(rid))
        .any(|r| r.is_hetero_aromatic())
    {
        return true;
    }
    // Inside a system marked aromatic as a whole, the ring flags stay
    // clear; a hetero member of any of this atom's rings decides.
    atom.is_in_aromatic_ring()
        && atom
            .ring_ids()
            .filter_map(|rid| mol.ring_with_id(rid))
            .any(|r| {
                r.atoms()
                    .iter()
                    .filter_map(|&a| mol.atom_with_iid(a))
                    .any(|a| a.atomic_num() != 6)
            })
}

/// The doubly-bonded neighbour with the highest priority (smallest
/// normalized id). Only meaningful after finalization.
pub fn first_doubly_bonded_nbr(mol: &Molecule, aiid: u16) -> Option<u16> {
    multiply_bonded_nbr(mol, aiid, |order| order == BondOrder::Double)
}

/// The multiply-bonded (double or triple) neighbour with the highest
/// priority. Only meaningful after finalization.
pub fn first_multiply_bonded_nbr(mol: &Molecule, aiid: u16) -> Option<u16> {
    multiply_bonded_nbr(mol, aiid, |order| order != BondOrder::Single)
}

fn multiply_bonded_nbr(
    mol: &Molecule,
    aiid: u16,
    want: impl Fn(BondOrder) -> bool,
) -> Option<u16> {
    let atom = mol.atom_with_iid(aiid)?;
    atom.bond_ids()
        .filter_map(|bid| mol.bond_with_id(bid))
        .filter(|b| want(b.order()))
        .filter_map(|b| mol.atom_with_iid(b.other_atom(aiid)))
        .min_by_key(|partner| partner.normalized_id())
        .map(|partner| partner.input_id())
}

/// Answers if the atom participates in at least one ring of the
/// given size.
pub fn atom_in_ring_of_size(mol: &Molecule, aiid: u16, size: usize) -> bool {
    mol.atom_with_iid(aiid).is_some_and(|atom| {
        atom.ring_ids()
            .filter_map(|rid| mol.ring_with_id(rid))
            .any(|r| r.size() == size)
    })
}

/// Answers if the atom participates in at least one ring larger than
/// the given size.
pub fn atom_in_ring_larger_than(mol: &Molecule, aiid: u16, size: usize) -> bool {
    mol.atom_with_iid(aiid).is_some_and(|atom| {
        atom.ring_ids()
            .filter_map(|rid| mol.ring_with_id(rid))
            .any(|r| r.size() > size)
    })
}

/// The unique smallest ring the atom participates in. Errors when the
/// atom is acyclic or several rings tie for smallest.
pub fn smallest_ring_of_atom(mol: &Molecule, aiid: u16) -> Result<u8, MoleculeError> {
    let rings: Vec<u8> = mol
        .atom_with_iid(aiid)
        .map(|a| a.ring_ids().collect())
        .unwrap_or_default();
    unique_smallest(mol, &rings, &format!("atom {}", aiid))
}

/// Answers if the bond participates in at least one ring of the
/// given size.
pub fn bond_in_ring_of_size(mol: &Molecule, bid: u16, size: usize) -> bool {
    mol.bond_with_id(bid).is_some_and(|bond| {
        bond.ring_ids()
            .filter_map(|rid| mol.ring_with_id(rid))
            .any(|r| r.size() == size)
    })
}

/// The unique smallest ring the bond participates in. Errors when the
/// bond is acyclic or several rings tie for smallest.
pub fn smallest_ring_of_bond(mol: &Molecule, bid: u16) -> Result<u8, MoleculeError> {
    let rings: Vec<u8> = mol
        .bond_with_id(bid)
        .map(|b| b.ring_ids().collect())
        .unwrap_or_default();
    unique_smallest(mol, &rings, &format!("bond {}", bid))
}

fn unique_smallest(mol: &Molecule, rings: &[u8], what: &str) -> Result<u8, MoleculeError> {
    if rings.is_empty() {
        return Err(MoleculeError::Internal {
            mol_id: mol.id(),
            detail: format!("{} is not cyclic", what),
        });
    }
    let mut best: Option<(usize, u8)> = None;
    let mut ties = 0usize;
    for &rid in rings {
        let Some(ring) = mol.ring_with_id(rid) else {
            continue;
        };
        match best {
            Some((size, _)) if ring.size() == size => ties += 1,
            Some((size, _)) if ring.size() < size => {
                best = Some((ring.size(), rid));
                ties = 1;
            }
            None => {
                best = Some((ring.size(), rid));
                ties = 1;
            }
            _ => {}
        }
    }
    match best {
        Some((_, rid)) if ties == 1 => Ok(rid),
        Some((size, _)) => Err(MoleculeError::Internal {
            mol_id: mol.id(),
            detail: format!("{} has {} smallest rings of size {}", what, ties, size),
        }),
        None => Err(MoleculeError::Internal {
            mol_id: mol.id(),
            detail: format!("{} is not cyclic", what),
        }),
    }
}

/// Answers if the two atoms share at least one ring.
pub fn have_common_rings(mol: &Molecule, aiid1: u16, aiid2: u16) -> bool {
    match (mol.atom_with_iid(aiid1), mol.atom_with_iid(aiid2)) {
        (Some(a1), Some(a2)) => a1.rings.intersection(&a2.rings).next().is_some(),
        _ => false,
    }
}

/// Answers if the two atoms participate in exactly the same rings.
pub fn in_same_rings_as(mol: &Molecule, aiid1: u16, aiid2: u16) -> bool {
    match (mol.atom_with_iid(aiid1), mol.atom_with_iid(aiid2)) {
        (Some(a1), Some(a2)) => a1.rings == a2.rings,
        _ => false,
    }
}

/// Answers if the first atom participates in every ring the second
/// one does (and possibly more).
pub fn in_all_rings_of(mol: &Molecule, aiid1: u16, aiid2: u16) -> bool {
    match (mol.atom_with_iid(aiid1), mol.atom_with_iid(aiid2)) {
        (Some(a1), Some(a2)) => a2.rings.is_subset(&a1.rings),
        _ => false,
    }
}

/// Number of atoms of the given ring currently marked aromatic. A
/// non-aromatic ring can still contain aromatic atoms, via a fused
/// neighbour.
pub fn ring_aromatic_atom_count(mol: &Molecule, rid: u8) -> usize {
    let Some(ring) = mol.ring_with_id(rid) else {
        return 0;
    };
    ring.atoms()
        .iter()
        .filter_map(|&aiid| mol.atom_with_iid(aiid))
        .filter(|a| a.is_in_aromatic_ring())
        .count()
}

/// Number of double bonds among the given ring's bonds.
pub fn ring_double_bond_count(mol: &Molecule, rid: u8) -> usize {
    let Some(ring) = mol.ring_with_id(rid) else {
        return 0;
    };
    ring.bonds()
        .iter()
        .filter_map(|&bid| mol.bond_with_id(bid))
        .filter(|b| b.order() == BondOrder::Double)
        .count()
}

/// The six-membered almost-aromatic test: aromatic atoms, atoms in
/// ring double bonds, carbons with an exocyclic double bond to a
/// heteroatom, and NH nitrogens together account for all six
/// members, with the exocyclic carbons and NH nitrogens in balance.
pub fn is_semi_aromatic_of_size6(mol: &Molecule, rid: u8) -> bool {
    let Some(ring) = mol.ring_with_id(rid) else {
        return false;
    };
    if ring.size() != 6 || ring.is_aromatic() {
        return false;
    }

    let n_aro = ring_aromatic_atom_count(mol, rid);
    let n_doubly = ring_double_bond_count(mol, rid) * 2;

    let mut n_nh = 0usize;
    let mut n_exo = 0usize;
    for &aiid in ring.atoms() {
        let Some(atom) = mol.atom_with_iid(aiid) else {
            continue;
        };
        match atom.atomic_num() {
            6 => {
                let has_exo_hetero_double = atom
                    .bond_ids()
                    .filter_map(|bid| mol.bond_with_id(bid))
                    .filter(|b| !b.is_cyclic() && b.order() == BondOrder::Double)
                    .filter_map(|b| mol.atom_with_iid(b.other_atom(aiid)))
                    .any(|partner| partner.atomic_num() != 6);
                if has_exo_hetero_double {
                    n_exo += 1;
                }
            }
            7 => {
                if atom.hydrogen_count() == 1 {
                    n_nh += 1;
                }
            }
            _ => {}
        }
    }

    n_aro + n_doubly + n_nh + n_exo == 6 && n_nh == n_exo
}

/// Answers the index of the first of two adjacent ring atoms that
/// both satisfy the given constraint, wrapping around the cyclic
/// sequence.
pub fn has_adjacent_atoms_satisfying<F>(mol: &Molecule, rid: u8, pred: F) -> Option<usize>
where
    F: Fn(&Molecule, &Atom) -> bool,
{
    let ring = mol.ring_with_id(rid)?;
    let atoms = ring.atoms();

    let mut found = false;
    for (i, &aiid) in atoms.iter().enumerate() {
        let satisfied = mol
            .atom_with_iid(aiid)
            .map(|a| pred(mol, a))
            .unwrap_or(false);
        if satisfied {
            if found {
                return Some(i - 1);
            }
            found = true;
        } else {
            found = false;
        }
    }

    // The run may wrap: last atom and first atom adjacent.
    if found {
        let first_ok = mol
            .atom_with_iid(atoms[0])
            .map(|a| pred(mol, a))
            .unwrap_or(false);
        if first_ok {
            return Some(atoms.len() - 1);
        }
    }
    None
}

/// Two adjacent carbonyl carbons in the ring.
pub fn has_adjacent_carbonyls(mol: &Molecule, rid: u8) -> Option<usize> {
    has_adjacent_atoms_satisfying(mol, rid, |m, a| is_carbonyl_c(m, a.input_id()))
}

/// Two adjacent saturated carbons in the ring.
pub fn has_adjacent_saturated_cc(mol: &Molecule, rid: u8) -> Option<usize> {
    has_adjacent_atoms_satisfying(mol, rid, |_, a| a.is_saturated_c())
}

/// Two adjacent saturated CH carbons in the ring.
pub fn has_adjacent_ch_ch(mol: &Molecule, rid: u8) -> Option<usize> {
    has_adjacent_atoms_satisfying(mol, rid, |_, a| a.is_saturated_c() && a.hydrogen_count() > 0)
}
