//! Ring and ring-system perception.
//!
//! Phase A detects the genuine simple rings: a Frerejacque short
//! circuit for acyclic molecules, terminal pruning down to the cyclic
//! skeleton, a single-ring shortcut, and otherwise a breadth-first
//! frontier of candidate paths whose closures are validated locally
//! (every member of a ring of size ≥ 4 must have exactly two
//! neighbours inside the candidate; more means an outer-shell
//! artifact). Phase B groups rings sharing atoms into ring systems
//! and annotates bridgeheads, spiro atoms and link bonds.

use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::trace;

use crate::constants::MAX_RINGS;
use crate::error::MoleculeError;
use crate::molecule::Molecule;
use crate::ring::{Ring, RingSystem};

// Backstop for the path frontier; chemistry-sized inputs stay far
// below it.
const MAX_FRONTIER_PATHS: usize = 200_000;

pub(crate) fn perceive(mol: &mut Molecule) -> Result<(), MoleculeError> {
    let independent = frerejacque(mol);
    if independent <= 0 {
        trace!(mol_id = mol.id(), "acyclic molecule, no rings to perceive");
        return Ok(());
    }
    if independent as usize > MAX_RINGS {
        return Err(MoleculeError::RingCapExceeded {
            mol_id: mol.id(),
            count: independent as usize,
            cap: MAX_RINGS,
        });
    }

    let cycles = detect_cycles(mol)?;
    if cycles.len() > MAX_RINGS {
        return Err(MoleculeError::RingCapExceeded {
            mol_id: mol.id(),
            count: cycles.len(),
            cap: MAX_RINGS,
        });
    }

    let mut rings = Vec::with_capacity(cycles.len());
    for (i, cycle) in cycles.iter().enumerate() {
        let mut ring = Ring::new(i as u8 + 1);
        for &aiid in cycle {
            ring.add_atom(mol, aiid)?;
        }
        ring.complete(mol)?;
        ring.canonicalize(mol)?;
        rings.push(ring);
    }

    let systems = group_ring_systems(&mut rings);
    mol.install_rings(rings, systems);
    annotate(mol);
    Ok(())
}

/// The Frerejacque number `|bonds| − |atoms| + 1`: the count of
/// independent cycles of a connected component.
pub(crate) fn frerejacque(mol: &Molecule) -> isize {
    mol.bond_count() as isize - mol.atom_count() as isize + 1
}

/// Phase A: answers the genuine simple rings as atom sequences in
/// cyclic order, deduplicated, deterministically ordered.
fn detect_cycles(mol: &Molecule) -> Result<Vec<Vec<u16>>, MoleculeError> {
    let span = mol.input_id_span();

    // Working adjacency copy, indexed by input id.
    let mut adj: Vec<Vec<u16>> = vec![Vec::new(); span + 1];
    let mut alive = BitSet::with_capacity(span + 1);
    for atom in mol.atoms() {
        let iid = atom.input_id();
        adj[iid as usize] = mol.neighbors_of(iid);
        alive.insert(iid as usize);
    }

    // Terminal pruning: peel degree-1 atoms until only the cyclic
    // skeleton remains.
    let mut queue: VecDeque<u16> = alive
        .iter()
        .filter(|&iid| adj[iid].len() == 1)
        .map(|iid| iid as u16)
        .collect();
    while let Some(iid) = queue.pop_front() {
        if !alive.contains(iid as usize) || adj[iid as usize].len() != 1 {
            continue;
        }
        let nbr = adj[iid as usize][0];
        alive.remove(iid as usize);
        adj[iid as usize].clear();
        adj[nbr as usize].retain(|&x| x != iid);
        if adj[nbr as usize].len() == 1 {
            queue.push_back(nbr);
        }
    }

    // Degree-0 stragglers can only appear if the whole residue
    // collapsed, which the Frerejacque check already ruled out.
    if alive.is_empty() {
        return Ok(Vec::new());
    }

    if alive.iter().all(|iid| adj[iid].len() == 2) {
        return Ok(vec![walk_single_ring(&adj, &alive)]);
    }

    frontier_search(&adj, &alive, mol.id())
}

/// The residue is one simple cycle: walk it.
fn walk_single_ring(adj: &[Vec<u16>], alive: &BitSet) -> Vec<u16> {
    let start = alive.iter().next().expect("non-empty residue") as u16;
    let mut cycle = vec![start];
    let mut prev = start;
    let mut cur = adj[start as usize][0];
    while cur != start {
        cycle.push(cur);
        let next = adj[cur as usize]
            .iter()
            .copied()
            .find(|&n| n != prev)
            .expect("degree-2 residue atom");
        prev = cur;
        cur = next;
    }
    cycle
}

/// Breadth-first frontier of candidate paths over the cyclic
/// skeleton. A path closing on an atom it already contains yields a
/// ring candidate; candidates are validated and deduplicated.
fn frontier_search(
    adj: &[Vec<u16>],
    alive: &BitSet,
    mol_id: u64,
) -> Result<Vec<Vec<u16>>, MoleculeError> {
    let seed = alive
        .iter()
        .find(|&iid| adj[iid].len() == 2)
        .or_else(|| alive.iter().next())
        .expect("non-empty residue") as u16;

    let residue_size = alive.len();
    let mut frontier: VecDeque<Vec<u16>> = VecDeque::new();
    frontier.push_back(vec![seed]);

    let mut seen_sets: Vec<BitSet> = Vec::new();
    let mut cycles: Vec<Vec<u16>> = Vec::new();
    let mut processed = 0usize;

    while let Some(path) = frontier.pop_front() {
        processed += 1;
        if processed > MAX_FRONTIER_PATHS {
            return Err(MoleculeError::RingCapExceeded {
                mol_id,
                count: processed,
                cap: MAX_FRONTIER_PATHS,
            });
        }

        let last = *path.last().expect("paths are never empty");
        for &nbr in &adj[last as usize] {
            match path.iter().position(|&a| a == nbr) {
                Some(pos) => {
                    let candidate = &path[pos..];
                    if candidate.len() < 3 || !is_genuine_ring(candidate, adj) {
                        continue;
                    }
                    let set: BitSet = candidate.iter().map(|&a| a as usize).collect();
                    if !seen_sets.contains(&set) {
                        seen_sets.push(set);
                        cycles.push(candidate.to_vec());
                    }
                }
                None => {
                    if path.len() < residue_size {
                        let mut extended = path.clone();
                        extended.push(nbr);
                        frontier.push_back(extended);
                    }
                }
            }
        }
    }

    // Deterministic ring ids: smaller rings first, then by member
    // set.
    cycles.sort_by(|a, b| {
        a.len().cmp(&b.len()).then_with(|| {
            let mut sa = a.clone();
            let mut sb = b.clone();
            sa.sort_unstable();
            sb.sort_unstable();
            sa.cmp(&sb)
        })
    });
    Ok(cycles)
}

/// A candidate of size 3 is always a ring. Larger candidates are
/// genuine iff every member has exactly two neighbours inside the
/// candidate; a third intra-candidate neighbour marks the perimeter
/// of a fused system rather than a simple ring.
fn is_genuine_ring(candidate: &[u16], adj: &[Vec<u16>]) -> bool {
    if candidate.len() == 3 {
        return true;
    }
    let members: BitSet = candidate.iter().map(|&a| a as usize).collect();
    candidate.iter().all(|&aiid| {
        let inside = adj[aiid as usize]
            .iter()
            .filter(|&&n| members.contains(n as usize))
            .count();
        inside == 2
    })
}

/// Phase B: connected components of the "shares an atom" relation
/// over rings. Also records each ring's neighbour rings.
fn group_ring_systems(rings: &mut [Ring]) -> Vec<RingSystem> {
    let n = rings.len();
    let mut adjacent = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            if !rings[i].common_atoms(&rings[j]).is_empty() {
                adjacent[i].push(j);
                adjacent[j].push(i);
                let (ri, rj) = (rings[i].id(), rings[j].id());
                rings[i].nbrs.push(rj);
                rings[j].nbrs.push(ri);
            }
        }
    }

    let mut systems = Vec::new();
    let mut visited = vec![false; n];
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut system = RingSystem::new(systems.len() as u8 + 1);
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(i) = stack.pop() {
            // Discovery order keeps every added ring connected to the
            // system's current membership.
            system
                .add_ring(&rings[i])
                .expect("DFS neighbour shares an atom with the system");
            rings[i].rs_id = system.id();
            for &j in &adjacent[i] {
                if !visited[j] {
                    visited[j] = true;
                    stack.push(j);
                }
            }
        }
        systems.push(system);
    }
    systems
}

/// Phase B annotations: bridgeheads, spiro atoms, link bonds.
fn annotate(mol: &mut Molecule) {
    let mut bridgeheads: Vec<u16> = Vec::new();
    let mut spiros: Vec<u16> = Vec::new();

    {
        let rings = mol.rings();
        for i in 0..rings.len() {
            for j in (i + 1)..rings.len() {
                let shared = rings[i].common_atoms(&rings[j]);
                if shared.len() >= 2 {
                    bridgeheads.extend(shared.iter().map(|a| a as u16));
                }
            }
        }

        for atom in mol.atoms() {
            let member_rings: Vec<&Ring> = atom
                .ring_ids()
                .filter_map(|rid| mol.ring_with_id(rid))
                .collect();
            if member_rings.len() < 2 {
                continue;
            }
            let sole_common = member_rings.iter().enumerate().all(|(i, r1)| {
                member_rings[i + 1..].iter().all(|r2| {
                    let shared = r1.common_atoms(r2);
                    shared.len() == 1 && shared.contains(atom.input_id() as usize)
                })
            });
            if sole_common {
                spiros.push(atom.input_id());
            }
        }
    }

    for iid in bridgeheads {
        if let Some(atom) = mol.atom_with_iid_mut(iid) {
            atom.is_bridgehead = true;
        }
    }
    for iid in spiros {
        if let Some(atom) = mol.atom_with_iid_mut(iid) {
            atom.is_spiro = true;
        }
    }

    mark_link_bonds(mol);
}

/// A bond that lies in no ring is a link bond when severing it
/// separates two ring systems: both sides of the cut must still
/// contain at least one cyclic atom.
fn mark_link_bonds(mol: &mut Molecule) {
    if mol.ring_system_count() < 2 {
        return;
    }

    let span = mol.input_id_span();
    let candidates: Vec<(u16, u16, u16)> = mol
        .bonds()
        .filter(|b| !b.is_cyclic())
        .map(|b| (b.id(), b.atom_ids().0, b.atom_ids().1))
        .collect();

    let mut links: Vec<u16> = Vec::new();
    for (bid, a1, a2) in candidates {
        // Every acyclic bond of a connected molecule is a bridge
        // edge: BFS from one endpoint with the bond severed yields
        // exactly the atoms on that side.
        let mut side = BitSet::with_capacity(span + 1);
        side.insert(a1 as usize);
        let mut queue = VecDeque::from([a1]);
        while let Some(cur) = queue.pop_front() {
            for nbr in mol.neighbors_of(cur) {
                if cur == a1 && nbr == a2 {
                    continue;
                }
                if !side.contains(nbr as usize) {
                    side.insert(nbr as usize);
                    queue.push_back(nbr);
                }
            }
        }

        let cyclic_near = mol
            .atoms()
            .any(|a| a.is_cyclic() && side.contains(a.input_id() as usize));
        let cyclic_far = mol
            .atoms()
            .any(|a| a.is_cyclic() && !side.contains(a.input_id() as usize));
        if cyclic_near && cyclic_far {
            links.push(bid);
        }
    }

    for bid in links {
        if let Some(bond) = mol.bond_with_id_mut(bid) {
            bond.is_link = true;
        }
    }
}
