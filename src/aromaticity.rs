//! Hückel aromaticity determination.
//!
//! Ring systems are judged as a whole first: the pi-electron sum over
//! every atom of the system, the 4n+2 rule, and a veto on sp3
//! carbons. A system that passes is marked aromatic along with its
//! atoms and bonds — its member rings deliberately stay unmarked.
//! A system that fails hands each constituent ring to the same
//! procedure individually.
//!
//! Certain fused systems (azulene, phenalenide) are known to need
//! special casing that this determiner does not attempt; they come
//! out as the plain rule decides, and the regression suite pins that
//! behaviour down rather than guessing at corrections.

use tracing::trace;

use crate::atom::Unsaturation;
use crate::molecule::Molecule;

/// Hückel's rule with the practical window applied: a conjugated
/// system is aromatic iff it holds `4n + 2` pi electrons for
/// `n ∈ {0..6}`. Beyond 26 electrons the rule loses reliability and
/// the answer is a flat no.
pub fn is_huckel_count(pi_electrons: u32) -> bool {
    (2..=26).contains(&pi_electrons) && (pi_electrons - 2) % 4 == 0
}

pub(crate) fn determine(mol: &mut Molecule) {
    let system_ids: Vec<u8> = mol.ring_systems().iter().map(|rs| rs.id()).collect();

    for rsid in system_ids {
        if system_is_aromatic(mol, rsid) {
            mark_system(mol, rsid);
            continue;
        }
        let ring_ids: Vec<u8> = match mol.ring_system_with_id(rsid) {
            Some(rs) => rs.ring_ids().to_vec(),
            None => continue,
        };
        for rid in ring_ids {
            if ring_is_aromatic(mol, rid) {
                mark_ring(mol, rid);
            }
        }
    }
}

fn system_is_aromatic(mol: &Molecule, rsid: u8) -> bool {
    let Some(rs) = mol.ring_system_with_id(rsid) else {
        return false;
    };
    let Some(pi) = rs.pi_electron_count(mol) else {
        return false;
    };
    if !is_huckel_count(pi) {
        return false;
    }
    let no_sp3_carbon = rs.atom_ids().all(|aiid| {
        mol.atom_with_iid(aiid)
            .map(|a| a.atomic_num() != 6 || a.unsaturation() != Unsaturation::None)
            .unwrap_or(false)
    });
    if no_sp3_carbon {
        trace!(mol_id = mol.id(), system = rsid, pi, "aromatic ring system");
    }
    no_sp3_carbon
}

fn ring_is_aromatic(mol: &Molecule, rid: u8) -> bool {
    let Some(ring) = mol.ring_with_id(rid) else {
        return false;
    };
    let Some(pi) = ring.pi_electron_count(mol) else {
        return false;
    };
    if !is_huckel_count(pi) {
        return false;
    }
    ring.atoms().iter().all(|&aiid| {
        mol.atom_with_iid(aiid)
            .map(|a| a.atomic_num() != 6 || a.unsaturation() != Unsaturation::None)
            .unwrap_or(false)
    })
}

fn mark_system(mol: &mut Molecule, rsid: u8) {
    let (atom_ids, bond_ids) = match mol.ring_system_with_id(rsid) {
        Some(rs) => (
            rs.atom_ids().collect::<Vec<_>>(),
            rs.bond_ids().collect::<Vec<_>>(),
        ),
        None => return,
    };
    if let Some(rs) = mol
        .ring_systems_mut()
        .iter_mut()
        .find(|rs| rs.id == rsid)
    {
        rs.is_aro = true;
    }
    for aiid in atom_ids {
        if let Some(atom) = mol.atom_with_iid_mut(aiid) {
            atom.is_in_aro_ring = true;
        }
    }
    for bid in bond_ids {
        if let Some(bond) = mol.bond_with_id_mut(bid) {
            bond.is_aro = true;
        }
    }
}

fn mark_ring(mol: &mut Molecule, rid: u8) {
    let (atom_ids, bond_ids) = match mol.ring_with_id(rid) {
        Some(r) => (r.atoms().to_vec(), r.bonds().to_vec()),
        None => return,
    };
    let has_hetero = atom_ids.iter().any(|&aiid| {
        mol.atom_with_iid(aiid)
            .map(|a| a.atomic_num() != 6)
            .unwrap_or(false)
    });
    if let Some(ring) = mol.rings_mut().iter_mut().find(|r| r.id == rid) {
        ring.is_aro = true;
        ring.is_het_aro = has_hetero;
    }
    for aiid in atom_ids {
        if let Some(atom) = mol.atom_with_iid_mut(aiid) {
            atom.is_in_aro_ring = true;
        }
    }
    for bid in bond_ids {
        if let Some(bond) = mol.bond_with_id_mut(bid) {
            bond.is_aro = true;
        }
    }
}
