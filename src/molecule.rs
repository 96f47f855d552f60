use std::sync::atomic::{AtomicU64, Ordering};

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, instrument};

use bit_set::BitSet;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::constants::{MAX_BONDS, MAX_FEATURES};
use crate::error::MoleculeError;
use crate::ring::{Ring, RingSystem};

static NEXT_MOL_ID: AtomicU64 = AtomicU64::new(1);

/// A (key, value) pair annotating a molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// A chemical molecule: one connected component of non-hydrogen
/// atoms and the bonds between them, plus everything derived from
/// that graph.
///
/// Lifecycle: created empty, populated through the atom and bond
/// builders, then [`finalize`](Self::finalize)d exactly once. After
/// finalization the topology and every derived annotation (normalized
/// ids, rings, ring systems, unsaturation, aromaticity) are frozen
/// for the lifetime of the instance.
///
/// The molecule exclusively owns its atoms, bonds, rings and ring
/// systems. Records refer to one another by id only; all lookups
/// resolve through the molecule.
#[derive(Debug)]
pub struct Molecule {
    id: u64,

    graph: UnGraph<Atom, Bond>,
    /// Node per input id; `None` for suppressed hydrogens.
    iid_nodes: Vec<Option<NodeIndex>>,
    /// Input ids that arrived as explicit hydrogen atoms.
    hydrogen_iids: BitSet,
    /// Edge per bond id; `None` for dropped hydrogen bonds.
    bond_edges: Vec<Option<petgraph::graph::EdgeIndex>>,

    rings: Vec<Ring>,
    ring_systems: Vec<RingSystem>,

    /// Free-form origin tag from the supplying reader (program name,
    /// registry id, …).
    vendor: String,
    attributes: Vec<Attribute>,
    finalized: bool,
}

impl Molecule {
    /// Creates an empty molecule with a fresh process-wide unique id.
    pub fn new() -> Molecule {
        Molecule {
            id: NEXT_MOL_ID.fetch_add(1, Ordering::Relaxed),
            graph: UnGraph::default(),
            iid_nodes: Vec::new(),
            hydrogen_iids: BitSet::default(),
            bond_edges: Vec::new(),
            rings: Vec::new(),
            ring_systems: Vec::new(),
            vendor: String::new(),
            attributes: Vec::new(),
            finalized: false,
        }
    }

    /// Globally unique id of this molecule.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of heavy (non-hydrogen) atoms.
    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of bonds between heavy atoms.
    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn ring_system_count(&self) -> usize {
        self.ring_systems.len()
    }

    /// The next atom input id the builder will accept.
    pub(crate) fn next_atom_iid(&self) -> u16 {
        self.iid_nodes.len() as u16 + 1
    }

    /// Highest input id handed out so far, suppressed hydrogens
    /// included; useful for sizing id-indexed scratch tables.
    pub(crate) fn input_id_span(&self) -> usize {
        self.iid_nodes.len()
    }

    /// The next bond id the builder will accept. Dropped hydrogen
    /// bonds consume their id, keeping parity with the input record
    /// numbering.
    pub(crate) fn next_bond_id(&self) -> u16 {
        self.bond_edges.len() as u16 + 1
    }

    // -- lookup -------------------------------------------------------

    /// The atom with the given input id.
    pub fn atom_with_iid(&self, iid: u16) -> Option<&Atom> {
        let node = (*self.iid_nodes.get((iid as usize).checked_sub(1)?)?)?;
        self.graph.node_weight(node)
    }

    /// The atom with the given normalized id. Only meaningful after
    /// finalization.
    pub fn atom_with_nid(&self, nid: u16) -> Option<&Atom> {
        self.atoms().find(|a| a.nid == nid)
    }

    /// The bond with the given id.
    pub fn bond_with_id(&self, bid: u16) -> Option<&Bond> {
        let edge = (*self.bond_edges.get((bid as usize).checked_sub(1)?)?)?;
        self.graph.edge_weight(edge)
    }

    /// The bond between the two given atoms, identified by their
    /// input ids.
    pub fn bond_between(&self, aiid1: u16, aiid2: u16) -> Option<&Bond> {
        let n1 = (*self.iid_nodes.get((aiid1 as usize).checked_sub(1)?)?)?;
        let n2 = (*self.iid_nodes.get((aiid2 as usize).checked_sub(1)?)?)?;
        let edge = self.graph.find_edge(n1, n2)?;
        self.graph.edge_weight(edge)
    }

    pub fn ring_with_id(&self, rid: u8) -> Option<&Ring> {
        self.rings.iter().find(|r| r.id == rid)
    }

    pub fn ring_system_with_id(&self, rsid: u8) -> Option<&RingSystem> {
        self.ring_systems.iter().find(|rs| rs.id == rsid)
    }

    /// Heavy atoms in input order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.graph.node_weights()
    }

    pub fn bonds(&self) -> impl Iterator<Item = &Bond> {
        self.graph.edge_weights()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn ring_systems(&self) -> &[RingSystem] {
        &self.ring_systems
    }

    /// Distinct heavy neighbours of the given atom, by input id.
    pub fn neighbors_of(&self, aiid: u16) -> Vec<u16> {
        let Some(idx) = (aiid as usize).checked_sub(1) else {
            return Vec::new();
        };
        let Some(Some(node)) = self.iid_nodes.get(idx).copied() else {
            return Vec::new();
        };
        self.graph
            .neighbors(node)
            .filter_map(|n| self.graph.node_weight(n))
            .map(|a| a.iid)
            .collect()
    }

    // -- aggregate counts ---------------------------------------------

    pub fn single_bond_count(&self) -> usize {
        self.bonds().filter(|b| b.order == BondOrder::Single).count()
    }

    pub fn double_bond_count(&self) -> usize {
        self.bonds().filter(|b| b.order == BondOrder::Double).count()
    }

    pub fn triple_bond_count(&self) -> usize {
        self.bonds().filter(|b| b.order == BondOrder::Triple).count()
    }

    /// Rings individually marked aromatic. Rings inside a system
    /// that is aromatic as a whole are deliberately not counted.
    pub fn aromatic_ring_count(&self) -> usize {
        self.rings.iter().filter(|r| r.is_aro).count()
    }

    pub fn aromatic_ring_system_count(&self) -> usize {
        self.ring_systems.iter().filter(|rs| rs.is_aro).count()
    }

    // -- metadata -----------------------------------------------------

    pub fn set_vendor(&mut self, vendor: &str) {
        self.vendor = vendor.to_owned();
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value.to_owned(),
            None => self.attributes.push(Attribute {
                name: name.to_owned(),
                value: value.to_owned(),
            }),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    // -- functional-group features ------------------------------------

    /// Appends a functional-group feature to the given atom's list;
    /// features are kept in the order added, most important first.
    pub fn add_atom_feature(&mut self, aiid: u16, fid: u16) -> Result<(), MoleculeError> {
        let mol_id = self.id;
        let atom = self
            .atom_with_iid_mut(aiid)
            .ok_or_else(|| MoleculeError::Internal {
                mol_id,
                detail: format!("no atom with input id {}", aiid),
            })?;
        if !atom.add_feature(fid) {
            return Err(MoleculeError::Internal {
                mol_id,
                detail: format!("atom {} exceeds the feature cap of {}", aiid, MAX_FEATURES),
            });
        }
        Ok(())
    }

    /// Removes the first instance of the given feature from the
    /// atom's list. Answers `true` upon a successful removal.
    pub fn remove_atom_feature(&mut self, aiid: u16, fid: u16) -> bool {
        self.atom_with_iid_mut(aiid)
            .map(|a| a.remove_feature(fid))
            .unwrap_or(false)
    }

    // -- construction (crate-internal; the builders are the public
    //    entry points) ------------------------------------------------

    pub(crate) fn is_hydrogen_iid(&self, iid: u16) -> bool {
        self.hydrogen_iids.contains(iid as usize)
    }

    pub(crate) fn has_iid(&self, iid: u16) -> bool {
        iid >= 1 && (iid as usize) <= self.iid_nodes.len()
    }

    /// Bumps the hydrogen count of the heavy atom at the given input
    /// id; used when a hydrogen-bearing bond is folded away.
    pub(crate) fn fold_hydrogen_into(&mut self, heavy_iid: u16) {
        let Some(idx) = (heavy_iid as usize).checked_sub(1) else {
            return;
        };
        if let Some(Some(node)) = self.iid_nodes.get(idx).copied() {
            if let Some(atom) = self.graph.node_weight_mut(node) {
                atom.h_count += 1;
            }
        }
    }

    /// Records a dropped bond id so subsequent bond ids keep their
    /// input numbering.
    pub(crate) fn retire_bond_id(&mut self) {
        self.bond_edges.push(None);
    }

    pub(crate) fn attach_atom(&mut self, atom: Atom) -> Result<u16, MoleculeError> {
        if self.finalized {
            return Err(MoleculeError::Internal {
                mol_id: self.id,
                detail: "cannot add atoms to a finalized molecule".into(),
            });
        }
        let iid = atom.iid;
        if iid != self.next_atom_iid() {
            return Err(MoleculeError::InputSequence {
                kind: "atom",
                expected: self.next_atom_iid(),
                given: iid,
            });
        }

        if atom.atomic_num == 1 {
            // Hydrogens are never materialised; their id is retired
            // and bonds to them will fold into the heavy partner.
            self.hydrogen_iids.insert(iid as usize);
            self.iid_nodes.push(None);
        } else {
            let node = self.graph.add_node(atom);
            self.iid_nodes.push(Some(node));
        }
        Ok(iid)
    }

    pub(crate) fn attach_bond(&mut self, bond: Bond) -> Result<u16, MoleculeError> {
        if self.finalized {
            return Err(MoleculeError::Internal {
                mol_id: self.id,
                detail: "cannot add bonds to a finalized molecule".into(),
            });
        }
        let bid = bond.id;
        if bid != self.next_bond_id() {
            return Err(MoleculeError::InputSequence {
                kind: "bond",
                expected: self.next_bond_id(),
                given: bid,
            });
        }

        let n1 = (bond.a1 as usize)
            .checked_sub(1)
            .and_then(|i| self.iid_nodes.get(i).copied().flatten())
            .ok_or_else(|| MoleculeError::InvalidBond {
                bond_id: bid,
                reason: format!("unknown atom input id {}", bond.a1),
            })?;
        let n2 = (bond.a2 as usize)
            .checked_sub(1)
            .and_then(|i| self.iid_nodes.get(i).copied().flatten())
            .ok_or_else(|| MoleculeError::InvalidBond {
                bond_id: bid,
                reason: format!("unknown atom input id {}", bond.a2),
            })?;

        if n1 == n2 {
            return Err(MoleculeError::InvalidBond {
                bond_id: bid,
                reason: format!("bond joins atom {} to itself", bond.a1),
            });
        }
        if self.graph.find_edge(n1, n2).is_some() {
            return Err(MoleculeError::InvalidBond {
                bond_id: bid,
                reason: format!("a bond between atoms {} and {} already exists", bond.a1, bond.a2),
            });
        }

        for node in [n1, n2] {
            let atom = &self.graph[node];
            if atom.bonds.len() >= MAX_BONDS {
                return Err(MoleculeError::Internal {
                    mol_id: self.id,
                    detail: format!("atom {} exceeds the bond cap of {}", atom.iid, MAX_BONDS),
                });
            }
        }

        let (a1, a2, order) = (bond.a1, bond.a2, bond.order);
        let edge = self.graph.add_edge(n1, n2, bond);
        self.bond_edges.push(Some(edge));

        for (node, nbr) in [(n1, a2), (n2, a1)] {
            let atom = &mut self.graph[node];
            atom.bonds.insert(bid as usize);
            for _ in 0..order.multiplicity() {
                atom.nbrs.push(nbr);
            }
            match order {
                BondOrder::Single => atom.single_bond_count += 1,
                BondOrder::Double => atom.double_bond_count += 1,
                BondOrder::Triple => atom.triple_bond_count += 1,
            }
        }
        Ok(bid)
    }

    // -- finalization -------------------------------------------------

    /// Runs the full analysis pipeline: canonical numbering, ring
    /// perception and grouping, unsaturation classification and
    /// aromaticity determination, in that order. Idempotent: calling
    /// it on an already-finalized molecule is a no-op.
    #[instrument(level = "debug", skip(self), fields(mol_id = self.id))]
    pub fn finalize(&mut self) -> Result<(), MoleculeError> {
        if self.finalized {
            return Ok(());
        }
        if self.atom_count() == 0 {
            self.finalized = true;
            return Ok(());
        }

        self.ensure_connected()?;

        crate::normalize::assign_normalized_ids(self);
        debug!(atoms = self.atom_count(), "normalized atom ids");

        crate::perception::perceive(self)?;
        debug!(
            rings = self.ring_count(),
            systems = self.ring_system_count(),
            "perceived rings"
        );

        crate::unsaturation::classify(self)?;
        crate::aromaticity::determine(self);
        debug!(
            aromatic_systems = self.aromatic_ring_system_count(),
            aromatic_rings = self.aromatic_ring_count(),
            "determined aromaticity"
        );

        self.finalized = true;
        Ok(())
    }

    /// A molecule models exactly one connected component; anything
    /// else means the upstream reader mis-split its input.
    fn ensure_connected(&self) -> Result<(), MoleculeError> {
        let n = self.graph.node_count();
        let Some(start) = self.graph.node_indices().next() else {
            return Ok(());
        };
        let mut seen = vec![false; n];
        let mut stack = vec![start];
        seen[start.index()] = true;
        let mut count = 0usize;
        while let Some(node) = stack.pop() {
            count += 1;
            for nb in self.graph.neighbors(node) {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    stack.push(nb);
                }
            }
        }
        if count != n {
            return Err(MoleculeError::Internal {
                mol_id: self.id,
                detail: format!(
                    "molecule is not a single connected component ({} of {} atoms reachable)",
                    count, n
                ),
            });
        }
        Ok(())
    }

    // -- crate-internal mutation used by the analyses -----------------

    pub(crate) fn atom_with_iid_mut(&mut self, iid: u16) -> Option<&mut Atom> {
        let node = (*self.iid_nodes.get((iid as usize).checked_sub(1)?)?)?;
        self.graph.node_weight_mut(node)
    }

    pub(crate) fn bond_with_id_mut(&mut self, bid: u16) -> Option<&mut Bond> {
        let edge = (*self.bond_edges.get((bid as usize).checked_sub(1)?)?)?;
        self.graph.edge_weight_mut(edge)
    }

    pub(crate) fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> {
        self.graph.node_weights_mut()
    }

    pub(crate) fn install_rings(&mut self, rings: Vec<Ring>, systems: Vec<RingSystem>) {
        for ring in &rings {
            for &aiid in &ring.atoms {
                if let Some(atom) = self.atom_with_iid_mut(aiid) {
                    atom.rings.insert(ring.id as usize);
                }
            }
            for &bid in &ring.bonds {
                if let Some(bond) = self.bond_with_id_mut(bid) {
                    bond.rings.insert(ring.id as usize);
                }
            }
        }
        self.rings = rings;
        self.ring_systems = systems;
    }

    pub(crate) fn rings_mut(&mut self) -> &mut [Ring] {
        &mut self.rings
    }

    pub(crate) fn ring_systems_mut(&mut self) -> &mut [RingSystem] {
        &mut self.ring_systems
    }
}

impl Default for Molecule {
    fn default() -> Self {
        Molecule::new()
    }
}
