//! Canonical atom numbering.
//!
//! Each atom gets a priority key: its own atomic number followed by
//! the atomic numbers of its expanded neighbour list (double-bonded
//! partners twice, triple-bonded thrice), sorted descending and
//! zero-padded to twenty slots. Sorting atoms descending by key gives
//! the canonical rank; rank k receives the k-th smallest surviving
//! input id as its normalized id, so normalized ids are always a
//! permutation of the input ids. Ties keep input order.
//!
//! The key reads only atomic numbers and bond orders, never the ids
//! being assigned, which is what makes a second run a no-op.

use crate::molecule::Molecule;

/// Neighbour slots in the priority key, beyond the atom's own number.
const KEY_NEIGHBOR_SLOTS: usize = 20;

type PriorityKey = [u8; KEY_NEIGHBOR_SLOTS + 1];

pub(crate) fn assign_normalized_ids(mol: &mut Molecule) {
    let mut keyed: Vec<(u16, PriorityKey)> = mol
        .atoms()
        .map(|a| (a.input_id(), priority_key(mol, a.input_id())))
        .collect();

    // Stable sort, descending by key: ties stay in input-id order.
    keyed.sort_by(|a, b| b.1.cmp(&a.1));

    let heavy_iids: Vec<u16> = mol.atoms().map(|a| a.input_id()).collect();
    let span = mol.input_id_span();
    let mut nid_of = vec![0u16; span + 1];
    for (rank, (iid, _)) in keyed.iter().enumerate() {
        let nid = heavy_iids[rank];
        nid_of[*iid as usize] = nid;
        if let Some(atom) = mol.atom_with_iid_mut(*iid) {
            atom.nid = nid;
        }
    }

    // Expanded neighbour lists are kept in ascending normalized-id
    // order from here on.
    for atom in mol.atoms_mut() {
        atom.nbrs.sort_by_key(|&iid| nid_of[iid as usize]);
    }
}

fn priority_key(mol: &Molecule, aiid: u16) -> PriorityKey {
    let mut key = [0u8; KEY_NEIGHBOR_SLOTS + 1];
    let Some(atom) = mol.atom_with_iid(aiid) else {
        return key;
    };
    key[0] = atom.atomic_num();

    let mut nbr_nums: Vec<u8> = atom
        .neighbors()
        .iter()
        .filter_map(|&nbr| mol.atom_with_iid(nbr))
        .map(|n| n.atomic_num())
        .collect();
    nbr_nums.sort_unstable_by(|a, b| b.cmp(a));

    for (slot, num) in key[1..].iter_mut().zip(nbr_nums) {
        *slot = num;
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;

    /// Propan-2-ol: C-C(-O)-C, input order C, C, O, C.
    fn isopropanol() -> Molecule {
        let mut mol = Molecule::new();
        for (sym, iid) in [("C", 1), ("C", 2), ("O", 3), ("C", 4)] {
            mol.new_atom_builder().new(sym, iid).unwrap().build().unwrap();
        }
        for (bid, a1, a2) in [(1, 1, 2), (2, 2, 3), (3, 2, 4)] {
            mol.new_bond_builder()
                .new(bid)
                .unwrap()
                .atoms(a1, a2)
                .unwrap()
                .order(BondOrder::Single)
                .build()
                .unwrap();
        }
        mol
    }

    #[test]
    fn normalized_ids_are_a_permutation_of_input_ids() {
        let mut mol = isopropanol();
        assign_normalized_ids(&mut mol);
        let mut nids: Vec<u16> = mol.atoms().map(|a| a.normalized_id()).collect();
        nids.sort_unstable();
        assert_eq!(nids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn oxygen_outranks_carbon() {
        let mut mol = isopropanol();
        assign_normalized_ids(&mut mol);
        // O has the highest own atomic number; the central C sees
        // O in its neighbourhood and outranks the methyl carbons.
        assert_eq!(mol.atom_with_iid(3).unwrap().normalized_id(), 1);
        assert_eq!(mol.atom_with_iid(2).unwrap().normalized_id(), 2);
    }

    #[test]
    fn ties_break_by_input_id() {
        let mut mol = isopropanol();
        assign_normalized_ids(&mut mol);
        // The two methyl carbons are equivalent; input order decides.
        let m1 = mol.atom_with_iid(1).unwrap().normalized_id();
        let m4 = mol.atom_with_iid(4).unwrap().normalized_id();
        assert!(m1 < m4);
    }

    #[test]
    fn neighbor_lists_reordered_ascending_by_nid() {
        let mut mol = isopropanol();
        assign_normalized_ids(&mut mol);
        let central = mol.atom_with_iid(2).unwrap();
        let nids: Vec<u16> = central
            .neighbors()
            .iter()
            .map(|&iid| mol.atom_with_iid(iid).unwrap().normalized_id())
            .collect();
        let mut sorted = nids.clone();
        sorted.sort_unstable();
        assert_eq!(nids, sorted);
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut mol = isopropanol();
        assign_normalized_ids(&mut mol);
        let first: Vec<u16> = mol.atoms().map(|a| a.normalized_id()).collect();
        assign_normalized_ids(&mut mol);
        let second: Vec<u16> = mol.atoms().map(|a| a.normalized_id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn double_bond_weighs_neighbor_twice() {
        // Acetone vs isopropanol central carbon: the doubly-bonded O
        // appears twice in the key, so the carbonyl C outranks an
        // otherwise identical alcohol C.
        let mut ketone = Molecule::new();
        for (sym, iid) in [("C", 1), ("C", 2), ("O", 3), ("C", 4)] {
            ketone.new_atom_builder().new(sym, iid).unwrap().build().unwrap();
        }
        for (bid, a1, a2, order) in [
            (1, 1, 2, BondOrder::Single),
            (2, 2, 3, BondOrder::Double),
            (3, 2, 4, BondOrder::Single),
        ] {
            ketone
                .new_bond_builder()
                .new(bid)
                .unwrap()
                .atoms(a1, a2)
                .unwrap()
                .order(order)
                .build()
                .unwrap();
        }
        let key_ketone = priority_key(&ketone, 2);
        let mol = isopropanol();
        let key_ol = priority_key(&mol, 2);
        assert!(key_ketone > key_ol);
        assert_eq!(key_ketone[0], 6);
        assert_eq!(&key_ketone[1..4], &[8, 8, 6]);
    }
}
