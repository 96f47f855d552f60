//! Per-atom unsaturation classification and pi-electron
//! contributions.
//!
//! Both drive large parts of the downstream decision rules; changes
//! here ripple into aromaticity and every predicate that consults
//! [`Unsaturation`].

use tracing::trace;

use crate::atom::Unsaturation;
use crate::bond::BondOrder;
use crate::element::{self, Element};
use crate::error::MoleculeError;
use crate::molecule::Molecule;

/// Computes the composite unsaturation state of every atom, and from
/// it the electron-donating / electron-withdrawing neighbour counts.
///
/// For a neutral atom carrying hydrogens, the implied oxidation state
/// (expanded neighbour count plus hydrogen count) must be permitted
/// by the element table; a violation is fatal and names the atom.
pub(crate) fn classify(mol: &mut Molecule) -> Result<(), MoleculeError> {
    let mut states: Vec<(u16, Unsaturation)> = Vec::with_capacity(mol.atom_count());

    for atom in mol.atoms() {
        let iid = atom.input_id();

        if atom.charge() != 0 {
            states.push((iid, Unsaturation::Charged));
            continue;
        }

        if atom.hydrogen_count() > 0 {
            let state = atom.neighbors().len() as i8 + atom.hydrogen_count() as i8;
            if !element::is_valid_oxidation_state(atom.atomic_num(), state) {
                let symbol = Element::from_atomic_num(atom.atomic_num())
                    .map(|e| e.symbol())
                    .unwrap_or("?");
                return Err(MoleculeError::OxidationState { iid, symbol, state });
            }
        }

        // All bonds single: the expanded neighbour list collapses to
        // the distinct bond count.
        if atom.degree() == atom.neighbors().len() {
            states.push((iid, Unsaturation::None));
            continue;
        }

        let mut doubles = 0u8;
        let mut hetero_doubles = 0u8;
        let mut triples = 0u8;
        let mut hetero_triples = 0u8;
        for bid in atom.bond_ids() {
            let Some(bond) = mol.bond_with_id(bid) else {
                continue;
            };
            let partner_is_hetero = mol
                .atom_with_iid(bond.other_atom(iid))
                .map(|p| p.atomic_num() != 6)
                .unwrap_or(false);
            match bond.order() {
                BondOrder::Double => {
                    doubles += 1;
                    if partner_is_hetero {
                        hetero_doubles += 1;
                    }
                }
                BondOrder::Triple => {
                    triples += 1;
                    if partner_is_hetero {
                        hetero_triples += 1;
                    }
                }
                BondOrder::Single => {}
            }
        }

        let state = if triples > 0 {
            if hetero_triples > 0 {
                Unsaturation::TripleBondW
            } else {
                Unsaturation::TripleBondC
            }
        } else {
            match (doubles, hetero_doubles) {
                (1, 0) => Unsaturation::DoubleBondC,
                (1, _) => Unsaturation::DoubleBondW,
                (2, 0) => Unsaturation::DoubleBondCC,
                (2, 1) => Unsaturation::DoubleBondCW,
                (2, _) => Unsaturation::DoubleBondWW,
                _ => Unsaturation::None,
            }
        };
        states.push((iid, state));
    }

    for (iid, state) in states {
        if let Some(atom) = mol.atom_with_iid_mut(iid) {
            atom.unsaturation = state;
        }
    }

    count_polar_neighbors(mol);
    trace!(mol_id = mol.id(), "classified unsaturation");
    Ok(())
}

/// An unsaturated withdrawer carries a double or triple bond to a
/// heteroatom; saturated withdrawers are halogens and positively
/// charged centres.
fn is_unsaturated_withdrawer(u: Unsaturation) -> bool {
    matches!(
        u,
        Unsaturation::DoubleBondW
            | Unsaturation::DoubleBondCW
            | Unsaturation::DoubleBondWW
            | Unsaturation::TripleBondW
    )
}

fn count_polar_neighbors(mol: &mut Molecule) {
    let mut counts: Vec<(u16, u8, u8, u8)> = Vec::with_capacity(mol.atom_count());

    for atom in mol.atoms() {
        let iid = atom.input_id();
        let mut ed = 0u8;
        let mut unsat_ew = 0u8;
        let mut sat_ew = 0u8;
        for nbr_iid in mol.neighbors_of(iid) {
            let Some(nbr) = mol.atom_with_iid(nbr_iid) else {
                continue;
            };
            if is_unsaturated_withdrawer(nbr.unsaturation()) {
                unsat_ew += 1;
            } else if nbr.is_halogen() || nbr.charge() > 0 {
                sat_ew += 1;
            }
            if nbr.is_electron_donating() {
                ed += 1;
            }
        }
        counts.push((iid, ed, unsat_ew, sat_ew));
    }

    for (iid, ed, unsat_ew, sat_ew) in counts {
        if let Some(atom) = mol.atom_with_iid_mut(iid) {
            atom.ed_nbr_count = ed;
            atom.unsat_ew_nbr_count = unsat_ew;
            atom.sat_ew_nbr_count = sat_ew;
        }
    }
}

/// The number of delocalised pi electrons the given atom contributes
/// to a conjugated ring, or `None` when the atom's configuration
/// disqualifies any ring containing it from aromaticity.
///
/// The table is keyed by `100·doubles + 10·singles + charge`; the
/// handful of context-dependent cases additionally look at whether
/// the relevant double-bond partner is cyclic.
pub fn pi_electron_contribution(mol: &Molecule, aiid: u16) -> Option<u8> {
    let atom = mol.atom_with_iid(aiid)?;
    let weighted = 100 * i16::from(atom.double_bond_count())
        + 10 * i16::from(atom.single_bond_count())
        + i16::from(atom.charge());

    let contribution = match atom.atomic_num() {
        6 => match weighted {
            // Carbanion in a ring: the lone pair is part of the system.
            19 => 2,
            110 => 1,
            // Two singles plus a double: only an endocyclic double
            // bond feeds the ring.
            120 => {
                if first_double_bond_is_cyclic(mol, aiid) {
                    1
                } else {
                    0
                }
            }
            _ => 0,
        },

        7 => match weighted {
            // Pyrrole-type N (with or without a substituent): lone
            // pair.
            20 | 30 => 2,
            // Pyridine-type N, or protonated with an endocyclic
            // double bond.
            110 | 121 => 1,
            _ => 0,
        },

        8 => match weighted {
            20 => 2,
            111 => 1,
            _ => 0,
        },

        16 => match weighted {
            20 => 2,
            111 => 1,
            // Cyclic sulfoxide: the S=O oxygen must be exocyclic for
            // the lone pair to stay in the ring.
            120 => {
                let partner = first_double_bond_partner(mol, aiid)?;
                if partner.atomic_num() == 8 && !partner.is_cyclic() {
                    2
                } else {
                    0
                }
            }
            // Sulfone-like S: two exocyclic double bonds poison the
            // ring.
            220 => {
                let exo = exocyclic_double_partner_count(mol, aiid);
                if exo > 1 {
                    return None;
                }
                0
            }
            _ => 0,
        },

        _ => 0,
    };

    Some(contribution)
}

fn first_double_bond_is_cyclic(mol: &Molecule, aiid: u16) -> bool {
    let Some(atom) = mol.atom_with_iid(aiid) else {
        return false;
    };
    atom.bond_ids()
        .filter_map(|bid| mol.bond_with_id(bid))
        .find(|b| b.order() == BondOrder::Double)
        .map(|b| b.is_cyclic())
        .unwrap_or(false)
}

fn first_double_bond_partner<'m>(mol: &'m Molecule, aiid: u16) -> Option<&'m crate::atom::Atom> {
    let atom = mol.atom_with_iid(aiid)?;
    let bond = atom
        .bond_ids()
        .filter_map(|bid| mol.bond_with_id(bid))
        .find(|b| b.order() == BondOrder::Double)?;
    mol.atom_with_iid(bond.other_atom(aiid))
}

fn exocyclic_double_partner_count(mol: &Molecule, aiid: u16) -> usize {
    let Some(atom) = mol.atom_with_iid(aiid) else {
        return 0;
    };
    atom.bond_ids()
        .filter_map(|bid| mol.bond_with_id(bid))
        .filter(|b| b.order() == BondOrder::Double)
        .filter_map(|b| mol.atom_with_iid(b.other_atom(aiid)))
        .filter(|partner| !partner.is_cyclic())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;

    fn add_atoms(mol: &mut Molecule, syms: &[&str]) {
        for (i, sym) in syms.iter().enumerate() {
            mol.new_atom_builder()
                .new(sym, i as u16 + 1)
                .unwrap()
                .build()
                .unwrap();
        }
    }

    fn add_bonds(mol: &mut Molecule, bonds: &[(u16, u16, BondOrder)]) {
        for (i, &(a1, a2, order)) in bonds.iter().enumerate() {
            mol.new_bond_builder()
                .new(i as u16 + 1)
                .unwrap()
                .atoms(a1, a2)
                .unwrap()
                .order(order)
                .build()
                .unwrap();
        }
    }

    #[test]
    fn all_single_bonds_is_none() {
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["C", "C"]);
        add_bonds(&mut mol, &[(1, 2, BondOrder::Single)]);
        mol.finalize().unwrap();
        assert_eq!(mol.atom_with_iid(1).unwrap().unsaturation(), Unsaturation::None);
    }

    #[test]
    fn charge_dominates() {
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["C", "O"]);
        add_bonds(&mut mol, &[(1, 2, BondOrder::Double)]);
        // Rebuild with a charged oxygen.
        let mut mol2 = Molecule::new();
        mol2.new_atom_builder().new("C", 1).unwrap().build().unwrap();
        mol2.new_atom_builder()
            .new("O", 2)
            .unwrap()
            .charge(5)
            .build()
            .unwrap();
        add_bonds(&mut mol2, &[(1, 2, BondOrder::Single)]);
        mol.finalize().unwrap();
        mol2.finalize().unwrap();
        assert_eq!(
            mol.atom_with_iid(2).unwrap().unsaturation(),
            Unsaturation::DoubleBondC
        );
        assert_eq!(
            mol2.atom_with_iid(2).unwrap().unsaturation(),
            Unsaturation::Charged
        );
    }

    #[test]
    fn double_bond_partner_kinds() {
        // O=C-C=C: the central carbons see one hetero and one carbon
        // double bond respectively.
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["O", "C", "C", "C"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Double),
                (2, 3, BondOrder::Single),
                (3, 4, BondOrder::Double),
            ],
        );
        mol.finalize().unwrap();
        assert_eq!(
            mol.atom_with_iid(2).unwrap().unsaturation(),
            Unsaturation::DoubleBondW
        );
        assert_eq!(
            mol.atom_with_iid(3).unwrap().unsaturation(),
            Unsaturation::DoubleBondC
        );
        assert_eq!(
            mol.atom_with_iid(1).unwrap().unsaturation(),
            Unsaturation::DoubleBondC
        );
    }

    #[test]
    fn cumulated_diene_kinds() {
        // O=C=C ketene-like carbon: one hetero, one carbon double.
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["O", "C", "C"]);
        add_bonds(
            &mut mol,
            &[(1, 2, BondOrder::Double), (2, 3, BondOrder::Double)],
        );
        mol.finalize().unwrap();
        assert_eq!(
            mol.atom_with_iid(2).unwrap().unsaturation(),
            Unsaturation::DoubleBondCW
        );
    }

    #[test]
    fn triple_bond_kinds() {
        let mut nitrile = Molecule::new();
        add_atoms(&mut nitrile, &["C", "C", "N"]);
        add_bonds(
            &mut nitrile,
            &[(1, 2, BondOrder::Single), (2, 3, BondOrder::Triple)],
        );
        nitrile.finalize().unwrap();
        assert_eq!(
            nitrile.atom_with_iid(2).unwrap().unsaturation(),
            Unsaturation::TripleBondW
        );

        let mut alkyne = Molecule::new();
        add_atoms(&mut alkyne, &["C", "C"]);
        add_bonds(&mut alkyne, &[(1, 2, BondOrder::Triple)]);
        alkyne.finalize().unwrap();
        assert_eq!(
            alkyne.atom_with_iid(1).unwrap().unsaturation(),
            Unsaturation::TripleBondC
        );
    }

    #[test]
    fn bad_oxidation_state_is_fatal() {
        // A neutral oxygen with three expanded neighbours and one
        // hydrogen implies state 4, which O cannot assume.
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["O", "C", "C", "C"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (1, 3, BondOrder::Single),
                (1, 4, BondOrder::Single),
            ],
        );
        // Give the oxygen an implicit hydrogen by folding.
        mol.atom_with_iid_mut(1).unwrap().h_count = 1;
        let err = mol.finalize().unwrap_err();
        assert!(matches!(
            err,
            MoleculeError::OxidationState { iid: 1, symbol: "O", state: 4 }
        ));
    }

    #[test]
    fn pi_contributions_benzene_carbon() {
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["C"; 6]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Double),
                (5, 6, BondOrder::Single),
                (6, 1, BondOrder::Double),
            ],
        );
        mol.finalize().unwrap();
        for atom in mol.atoms() {
            assert_eq!(pi_electron_contribution(&mol, atom.input_id()), Some(1));
        }
    }

    #[test]
    fn pi_contribution_exocyclic_double_bond_is_zero() {
        // Methylenecyclohexane pattern: ring carbon with an exocyclic
        // C=C contributes nothing.
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["C"; 7]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Single),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Single),
                (5, 6, BondOrder::Single),
                (6, 1, BondOrder::Single),
                (1, 7, BondOrder::Double),
            ],
        );
        mol.finalize().unwrap();
        assert_eq!(pi_electron_contribution(&mol, 1), Some(0));
    }

    #[test]
    fn pi_contribution_pyrrole_nitrogen() {
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["N", "C", "C", "C", "C"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Double),
                (5, 1, BondOrder::Single),
            ],
        );
        mol.atom_with_iid_mut(1).unwrap().h_count = 1;
        mol.finalize().unwrap();
        assert_eq!(pi_electron_contribution(&mol, 1), Some(2));
    }

    #[test]
    fn pi_contribution_cyclopentadienyl_anion() {
        let mut mol = Molecule::new();
        mol.new_atom_builder()
            .new("C", 1)
            .unwrap()
            .charge(5)
            .build()
            .unwrap();
        for i in 2..=5u16 {
            mol.new_atom_builder().new("C", i).unwrap().build().unwrap();
        }
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Double),
                (5, 1, BondOrder::Single),
            ],
        );
        mol.finalize().unwrap();
        assert_eq!(pi_electron_contribution(&mol, 1), Some(2));
    }

    #[test]
    fn sulfone_poisons_aromaticity() {
        // Thiophene dioxide pattern: S with two exocyclic S=O.
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["S", "C", "C", "C", "C", "O", "O"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Double),
                (5, 1, BondOrder::Single),
                (1, 6, BondOrder::Double),
                (1, 7, BondOrder::Double),
            ],
        );
        mol.finalize().unwrap();
        assert_eq!(pi_electron_contribution(&mol, 1), None);
    }

    #[test]
    fn thiophene_sulfur_contributes_lone_pair() {
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["S", "C", "C", "C", "C"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (3, 4, BondOrder::Single),
                (4, 5, BondOrder::Double),
                (5, 1, BondOrder::Single),
            ],
        );
        mol.finalize().unwrap();
        assert_eq!(pi_electron_contribution(&mol, 1), Some(2));
    }

    #[test]
    fn withdrawing_neighbors_counted() {
        // Acetone: the methyl carbons each see one unsaturated
        // electron-withdrawing neighbour (the carbonyl C).
        let mut mol = Molecule::new();
        add_atoms(&mut mol, &["C", "C", "O", "C"]);
        add_bonds(
            &mut mol,
            &[
                (1, 2, BondOrder::Single),
                (2, 3, BondOrder::Double),
                (2, 4, BondOrder::Single),
            ],
        );
        mol.atom_with_iid_mut(1).unwrap().h_count = 3;
        mol.atom_with_iid_mut(4).unwrap().h_count = 3;
        mol.finalize().unwrap();
        assert_eq!(
            mol.atom_with_iid(1)
                .unwrap()
                .electron_withdrawing_neighbor_count(),
            1
        );
        assert_eq!(mol.atom_with_iid(1).unwrap().enolic_hydrogen_count(), 3);
        // The carbonyl carbon sees two donating methyls... but they
        // are carbons with hydrogens, counted via the methyl rule.
        assert_eq!(mol.atom_with_iid(2).unwrap().ed_nbr_count, 2);
    }
}
