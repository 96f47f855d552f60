use bit_set::BitSet;

use crate::constants::{MAX_BONDS, MAX_FEATURES};
use crate::element::Element;

/// Radical configurations an atom can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radical {
    #[default]
    None,
    Singlet,
    Doublet,
    Triplet,
}

/// Composite per-atom state summarizing charge and the double/triple
/// bond inventory, with partner kinds (`C` = carbon partner, `W` =
/// heteroatom partner).
///
/// The order matters: everything above [`None`](Self::None) counts as
/// a departure from a fully saturated, neutral centre, which is how
/// predicates like `is_functional` read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Unsaturation {
    #[default]
    None,
    Charged,
    DoubleBondC,
    DoubleBondW,
    DoubleBondCC,
    DoubleBondCW,
    DoubleBondWW,
    TripleBondC,
    TripleBondW,
}

/// A non-hydrogen atomic centre.
///
/// Hydrogens never appear as `Atom` records; they are accumulated in
/// the `h_count` of their heavy neighbour while bonds are fed in.
/// Everything below the coordinates is derived state, filled in by
/// the molecule as bonds arrive and during finalization. An atom
/// refers to its bonds, rings and features by id only; the owning
/// [`Molecule`](crate::Molecule) resolves them.
#[derive(Debug, Clone)]
pub struct Atom {
    pub(crate) atomic_num: u8,
    /// Isotope symbol, when distinct from the element default.
    pub(crate) isotope: Option<String>,
    /// Serial input id, 1-based, in the order atoms were added.
    pub(crate) iid: u16,
    /// Normalized id, assigned by canonical numbering.
    pub(crate) nid: u16,

    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,

    /// Implicit + explicit hydrogens attached to this atom.
    pub(crate) h_count: u8,
    pub(crate) charge: i8,
    pub(crate) valence: i8,
    pub(crate) radical: Radical,

    pub(crate) unsaturation: Unsaturation,

    /// Bond ids incident to this atom.
    pub(crate) bonds: BitSet,
    /// Expanded neighbour list: a neighbour appears once per bond
    /// order, so a double-bonded partner is listed twice.
    pub(crate) nbrs: Vec<u16>,
    pub(crate) single_bond_count: u8,
    pub(crate) double_bond_count: u8,
    pub(crate) triple_bond_count: u8,

    /// Ids of the rings this atom participates in.
    pub(crate) rings: BitSet,
    pub(crate) is_in_aro_ring: bool,
    pub(crate) is_bridgehead: bool,
    pub(crate) is_spiro: bool,

    /// Functional-group feature ids, most important first.
    pub(crate) features: Vec<u16>,

    /// Electron-donating neighbour count.
    pub(crate) ed_nbr_count: u8,
    /// Unsaturated electron-withdrawing neighbour count.
    pub(crate) unsat_ew_nbr_count: u8,
    /// Saturated electron-withdrawing neighbour count.
    pub(crate) sat_ew_nbr_count: u8,
}

impl Atom {
    pub(crate) fn new(element: Element, iid: u16) -> Atom {
        Atom {
            atomic_num: element.atomic_num(),
            isotope: None,
            iid,
            nid: 0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            h_count: 0,
            charge: 0,
            valence: element.default_valence(),
            radical: Radical::None,
            unsaturation: Unsaturation::None,
            bonds: BitSet::with_capacity(MAX_BONDS),
            nbrs: Vec::with_capacity(MAX_BONDS),
            single_bond_count: 0,
            double_bond_count: 0,
            triple_bond_count: 0,
            rings: BitSet::default(),
            is_in_aro_ring: false,
            is_bridgehead: false,
            is_spiro: false,
            features: Vec::with_capacity(MAX_FEATURES),
            ed_nbr_count: 0,
            unsat_ew_nbr_count: 0,
            sat_ew_nbr_count: 0,
        }
    }

    pub fn atomic_num(&self) -> u8 {
        self.atomic_num
    }

    pub fn isotope(&self) -> Option<&str> {
        self.isotope.as_deref()
    }

    /// Serial input id of this atom (1-based).
    pub fn input_id(&self) -> u16 {
        self.iid
    }

    /// Canonical id assigned by normalization; `0` until the molecule
    /// is finalized.
    pub fn normalized_id(&self) -> u16 {
        self.nid
    }

    pub fn coordinates(&self) -> (f32, f32, f32) {
        (self.x, self.y, self.z)
    }

    pub fn hydrogen_count(&self) -> u8 {
        self.h_count
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    pub fn valence(&self) -> i8 {
        self.valence
    }

    pub fn radical(&self) -> Radical {
        self.radical
    }

    pub fn unsaturation(&self) -> Unsaturation {
        self.unsaturation
    }

    /// Ids of bonds incident to this atom.
    pub fn bond_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.bonds.iter().map(|b| b as u16)
    }

    /// The expanded neighbour list: each neighbour's input id appears
    /// once per bond order. After finalization the list is ordered by
    /// ascending normalized id.
    pub fn neighbors(&self) -> &[u16] {
        &self.nbrs
    }

    pub fn single_bond_count(&self) -> u8 {
        self.single_bond_count
    }

    pub fn double_bond_count(&self) -> u8 {
        self.double_bond_count
    }

    pub fn triple_bond_count(&self) -> u8 {
        self.triple_bond_count
    }

    /// Number of distinct bonds on this atom.
    pub fn degree(&self) -> usize {
        self.bonds.len()
    }

    /// Ids of the rings this atom participates in.
    pub fn ring_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.rings.iter().map(|r| r as u8)
    }

    pub fn is_in_aromatic_ring(&self) -> bool {
        self.is_in_aro_ring
    }

    pub fn is_bridgehead(&self) -> bool {
        self.is_bridgehead
    }

    pub fn is_spiro(&self) -> bool {
        self.is_spiro
    }

    /// Answers if this atom participates in at least one ring.
    pub fn is_cyclic(&self) -> bool {
        !self.rings.is_empty()
    }

    /// Answers if this atom has more than two distinct neighbours.
    pub fn is_junction(&self) -> bool {
        self.bonds.len() > 2
    }

    // -- feature list -------------------------------------------------

    /// The primary feature of this atom, `0` if none is present.
    pub fn functional_group(&self) -> u16 {
        self.features.first().copied().unwrap_or(0)
    }

    /// Feature ids in descending order of importance.
    pub fn features(&self) -> &[u16] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn has_feature(&self, fid: u16) -> bool {
        self.features.contains(&fid)
    }

    /// Answers `false` when the feature list is already at capacity.
    pub(crate) fn add_feature(&mut self, fid: u16) -> bool {
        if self.features.len() >= MAX_FEATURES {
            return false;
        }
        self.features.push(fid);
        true
    }

    /// Removes the first instance of the given feature. Answers
    /// `true` upon a successful removal.
    pub(crate) fn remove_feature(&mut self, fid: u16) -> bool {
        match self.features.iter().position(|&f| f == fid) {
            Some(idx) => {
                self.features.remove(idx);
                true
            }
            None => false,
        }
    }

    // -- local structural predicates ----------------------------------

    /// A carbon with exactly two hydrogens.
    pub fn is_ch2(&self) -> bool {
        self.atomic_num == 6 && self.h_count == 2
    }

    /// A carbon with exactly three hydrogens.
    pub fn is_ch3(&self) -> bool {
        self.atomic_num == 6 && self.h_count == 3
    }

    /// An oxygen with exactly one hydrogen.
    pub fn is_hydroxyl(&self) -> bool {
        self.atomic_num == 8 && self.h_count == 1
    }

    /// A carbon with no double or triple bonds and no charge.
    pub fn is_saturated_c(&self) -> bool {
        self.atomic_num == 6 && self.unsaturation == Unsaturation::None
    }

    pub fn is_saturated_ch2(&self) -> bool {
        self.is_saturated_c() && self.h_count == 2
    }

    pub fn is_saturated_c_having_h(&self) -> bool {
        self.is_saturated_c() && self.h_count > 0
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self.atomic_num, 9 | 17 | 35 | 53)
    }

    /// A neutral nitrogen in the trivalent state.
    pub fn is_trivalent_n(&self) -> bool {
        self.atomic_num == 7
            && self.charge == 0
            && self.nbrs.len() as u8 + self.h_count == 3
    }

    /// An oxygen bound by exactly one bond.
    pub fn is_terminal_o(&self) -> bool {
        self.atomic_num == 8 && self.bonds.len() == 1
    }

    /// A heteroatom bound by exactly one bond.
    pub fn is_terminal_hetero_atom(&self) -> bool {
        self.atomic_num != 6 && self.bonds.len() == 1
    }

    pub fn is_one_of_nos(&self) -> bool {
        matches!(self.atomic_num, 7 | 8 | 16)
    }

    pub fn is_one_of_nops(&self) -> bool {
        matches!(self.atomic_num, 7 | 8 | 15 | 16)
    }

    /// An amino, hydroxyl or thiol centre.
    pub fn is_nh2_or_oh_or_sh(&self) -> bool {
        match self.atomic_num {
            7 => self.h_count == 2,
            8 | 16 => self.h_count == 1,
            _ => false,
        }
    }

    /// A singly-bound heteroatom that can depart with its bond pair.
    pub fn is_atomic_leaving_group(&self) -> bool {
        self.bonds.len() == 1 && self.atomic_num != 6
    }

    /// An electron-donating centre: an N/O/S with only single bonds
    /// and no positive charge, or a methyl carbon.
    pub fn is_electron_donating(&self) -> bool {
        if self.is_ch3() {
            return true;
        }
        self.is_one_of_nos() && self.unsaturation == Unsaturation::None && self.charge <= 0
    }

    /// Answers if this atom can play an active role in a reaction, in
    /// a substituting position. An atom can still be a reaction
    /// centre without being functional.
    pub fn is_functional(&self) -> bool {
        self.atomic_num != 6
            || !self.features.is_empty()
            || self.unsaturation > Unsaturation::None
    }

    /// Total of unsaturated and saturated electron-withdrawing
    /// neighbours.
    pub fn electron_withdrawing_neighbor_count(&self) -> usize {
        (self.unsat_ew_nbr_count + self.sat_ew_nbr_count) as usize
    }

    pub fn electron_donating_neighbor_count(&self) -> usize {
        self.ed_nbr_count as usize
    }

    /// Number of attached hydrogens, if this atom is enolic: a
    /// saturated, non-bridgehead carbon with at least one
    /// electron-withdrawing neighbour.
    pub fn enolic_hydrogen_count(&self) -> u8 {
        if self.atomic_num != 6
            || self.unsaturation > Unsaturation::None
            || self.electron_withdrawing_neighbor_count() == 0
            || self.is_bridgehead
        {
            return 0;
        }
        self.h_count
    }
}
