//! Orbit partition of nodes, commodities, flow links and certificate indices.
//!
//! Mirrors the representative structures the reduced LP is written over:
//! - commodity orbits under the full group, with a frame permutation per
//!   member mapping the representative's coordinates onto the member's,
//! - per-representative-commodity link orbits under the generators fixing
//!   both endpoints (the commodity stabilizer),
//! - orbits of `(host, link)` certificate indices,
//! - one representative per class of identically-structured link constraints.

use std::collections::{HashMap, VecDeque};

use crate::topo::{Commodity, DLink, Node, Topology};

use super::search::{find_generators, SymCfg};
use super::types::Perm;

/// One orbit of commodities with per-member frame maps.
#[derive(Clone, Debug)]
pub struct CommodityOrbit {
    pub rep: Commodity,
    /// Sorted orbit members (the representative included).
    pub members: Vec<Commodity>,
    /// Member -> permutation carrying the representative's frame to the
    /// member's frame (`frame((s̄,d̄)) = (s,d)`).
    frames: HashMap<Commodity, Perm>,
    /// Member -> inverse frame (member coordinates back to the representative).
    inv_frames: HashMap<Commodity, Perm>,
}

impl CommodityOrbit {
    /// Frame permutation of `member` (identity for the representative).
    pub fn frame(&self, member: Commodity) -> &Perm {
        &self.frames[&member]
    }

    /// Pull a link in `member`'s frame back into the representative's frame.
    #[inline]
    pub fn to_rep_frame(&self, member: Commodity, link: DLink) -> DLink {
        self.inv_frames[&member].apply_pair(link)
    }
}

/// Link orbits inside one representative commodity's frame.
#[derive(Clone, Debug)]
pub struct FlowLinkOrbits {
    /// Sorted orbit representatives; one flow variable each.
    pub rep_links: Vec<DLink>,
    /// Every directed link -> its orbit representative.
    pub rep_of: HashMap<DLink, DLink>,
}

/// Orbits of `(host node, directed link)` certificate indices.
#[derive(Clone, Debug)]
pub struct AuxOrbits {
    /// Sorted orbit representatives; one β and one γ variable each.
    pub reps: Vec<(Node, DLink)>,
    /// Every `(host, link)` pair -> index into `reps`.
    pub rep_of: HashMap<(Node, DLink), usize>,
}

/// The full orbit partition consumed by the reduced formulation.
#[derive(Clone, Debug)]
pub struct OrbitPartition {
    pub generators: Vec<Perm>,
    /// False if generator discovery hit its budget; the partition is then a
    /// certified subgroup's partition (valid, less compressive).
    pub complete: bool,
    pub node_orbit_of: Vec<usize>,
    pub node_orbits: Vec<Vec<Node>>,
    pub commodity_orbits: Vec<CommodityOrbit>,
    pub commodity_orbit_of: HashMap<Commodity, usize>,
    /// Parallel to `commodity_orbits`.
    pub flow_links: Vec<FlowLinkOrbits>,
    pub aux: AuxOrbits,
    /// Representative links for the certificate throughput constraints.
    pub link_constrs: Vec<DLink>,
}

impl OrbitPartition {
    /// Run generator discovery and build the partition.
    pub fn detect(topo: &Topology, cfg: &SymCfg) -> Self {
        let outcome = find_generators(topo, cfg);
        Self::compute(topo, outcome.generators, outcome.complete)
    }

    /// Identity-group partition: every element its own orbit. The reduced
    /// formulation over this partition is exactly the full formulation.
    pub fn trivial(topo: &Topology) -> Self {
        Self::compute(topo, Vec::new(), true)
    }

    /// Build all orbit structures from verified generators.
    pub fn compute(topo: &Topology, generators: Vec<Perm>, complete: bool) -> Self {
        let n = topo.num_nodes();
        let dlinks = topo.dlinks();
        let hosts = topo.host_nodes();

        // Node orbits.
        let mut node_orbit_of = vec![usize::MAX; n];
        let mut node_orbits: Vec<Vec<Node>> = Vec::new();
        for start in 0..n {
            if node_orbit_of[start] != usize::MAX {
                continue;
            }
            let idx = node_orbits.len();
            let mut members = vec![start];
            node_orbit_of[start] = idx;
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for g in &generators {
                    let v = g.apply(u);
                    if node_orbit_of[v] == usize::MAX {
                        node_orbit_of[v] = idx;
                        members.push(v);
                        queue.push_back(v);
                    }
                }
            }
            members.sort_unstable();
            node_orbits.push(members);
        }

        // Commodity orbits with frame maps (BFS over generator images).
        let mut commodity_orbits: Vec<CommodityOrbit> = Vec::new();
        let mut commodity_orbit_of: HashMap<Commodity, usize> = HashMap::new();
        for &rep in &topo.commodities() {
            if commodity_orbit_of.contains_key(&rep) {
                continue;
            }
            let idx = commodity_orbits.len();
            let mut frames: HashMap<Commodity, Perm> = HashMap::new();
            frames.insert(rep, Perm::identity(n));
            commodity_orbit_of.insert(rep, idx);
            let mut queue = VecDeque::from([rep]);
            while let Some(sd) = queue.pop_front() {
                let frame = frames[&sd].clone();
                for g in &generators {
                    let asd = g.apply_pair(sd);
                    if !frames.contains_key(&asd) {
                        frames.insert(asd, frame.then(g));
                        commodity_orbit_of.insert(asd, idx);
                        queue.push_back(asd);
                    }
                }
            }
            let mut members: Vec<Commodity> = frames.keys().copied().collect();
            members.sort_unstable();
            let inv_frames = frames
                .iter()
                .map(|(&sd, p)| (sd, p.inverse()))
                .collect();
            commodity_orbits.push(CommodityOrbit {
                rep,
                members,
                frames,
                inv_frames,
            });
        }

        // Per-representative flow-link orbits under the commodity stabilizer.
        let mut flow_links = Vec::with_capacity(commodity_orbits.len());
        for orbit in &commodity_orbits {
            let (s, d) = orbit.rep;
            let stab: Vec<&Perm> = generators
                .iter()
                .filter(|g| g.apply(s) == s && g.apply(d) == d)
                .collect();
            let mut rep_of: HashMap<DLink, DLink> = HashMap::new();
            let mut rep_links = Vec::new();
            for &canon in &dlinks {
                if rep_of.contains_key(&canon) {
                    continue;
                }
                rep_links.push(canon);
                rep_of.insert(canon, canon);
                let mut queue = VecDeque::from([canon]);
                while let Some(link) = queue.pop_front() {
                    for g in &stab {
                        let alink = g.apply_pair(link);
                        if !rep_of.contains_key(&alink) {
                            rep_of.insert(alink, canon);
                            queue.push_back(alink);
                        }
                    }
                }
            }
            flow_links.push(FlowLinkOrbits { rep_links, rep_of });
        }

        // Certificate-index orbits under the full generator set.
        let mut aux_rep_of: HashMap<(Node, DLink), usize> = HashMap::new();
        let mut aux_reps: Vec<(Node, DLink)> = Vec::new();
        for &u in &hosts {
            for &link in &dlinks {
                let seed = (u, link);
                if aux_rep_of.contains_key(&seed) {
                    continue;
                }
                let idx = aux_reps.len();
                aux_reps.push(seed);
                aux_rep_of.insert(seed, idx);
                let mut queue = VecDeque::from([seed]);
                while let Some((v, l)) = queue.pop_front() {
                    for g in &generators {
                        let next = (g.apply(v), g.apply_pair(l));
                        if !aux_rep_of.contains_key(&next) {
                            aux_rep_of.insert(next, idx);
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
        let aux = AuxOrbits {
            reps: aux_reps,
            rep_of: aux_rep_of,
        };

        // Group identically-structured link constraints by their certificate
        // count encoding; keep the smallest link of each class.
        let mut by_encoding: HashMap<Vec<(usize, u32)>, DLink> = HashMap::new();
        for &link in &dlinks {
            let mut counts: HashMap<usize, u32> = HashMap::new();
            for &u in &hosts {
                *counts.entry(aux.rep_of[&(u, link)]).or_insert(0) += topo.hosts(u);
            }
            let mut encoding: Vec<(usize, u32)> = counts.into_iter().collect();
            encoding.sort_unstable();
            by_encoding
                .entry(encoding)
                .and_modify(|rep| {
                    if link < *rep {
                        *rep = link;
                    }
                })
                .or_insert(link);
        }
        let mut link_constrs: Vec<DLink> = by_encoding.into_values().collect();
        link_constrs.sort_unstable();

        OrbitPartition {
            generators,
            complete,
            node_orbit_of,
            node_orbits,
            commodity_orbits,
            commodity_orbit_of,
            flow_links,
            aux,
            link_constrs,
        }
    }

    pub fn num_node_orbits(&self) -> usize {
        self.node_orbits.len()
    }

    pub fn num_commodity_orbits(&self) -> usize {
        self.commodity_orbits.len()
    }

    /// Total reduced flow-variable count (sum of per-orbit link classes).
    pub fn num_flow_classes(&self) -> usize {
        self.flow_links.iter().map(|f| f.rep_links.len()).sum()
    }
}
