//! Topology representation and construction.
//!
//! Nodes carry the hose-model attributes (`hosts`, `routing`), links carry
//! positive capacities. The structure is immutable once built; every
//! downstream stage reads it through the accessor views.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use sha2::{Digest, Sha256};

use super::TopologyError;

/// Node index. Topologies are always indexed `0..num_nodes`.
pub type Node = usize;

/// Directed link `(tail, head)`.
pub type DLink = (Node, Node);

/// Ordered source/destination pair of host nodes.
pub type Commodity = (Node, Node);

/// Per-node attributes.
///
/// `hosts` is the number of attached servers and bounds the node's hose-model
/// ingress/egress demand; `routing` marks transit-capable nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeAttrs {
    pub hosts: u32,
    pub routing: bool,
}

/// Deterministic topology fingerprint (SHA-256 of the canonical encoding).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Immutable capacitated topology.
///
/// Invariants (enforced by [`TopologyBuilder::build`]):
/// - connected,
/// - all capacities positive and finite,
/// - at least two host nodes (otherwise there are no commodities).
#[derive(Clone, Debug)]
pub struct Topology {
    name: String,
    attrs: Vec<NodeAttrs>,
    adj: Vec<Vec<Node>>,
    cap: HashMap<(Node, Node), f64>,
}

impl Topology {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.attrs.len()
    }

    #[inline]
    pub fn attrs(&self, n: Node) -> NodeAttrs {
        self.attrs[n]
    }

    #[inline]
    pub fn hosts(&self, n: Node) -> u32 {
        self.attrs[n].hosts
    }

    #[inline]
    pub fn is_routing(&self, n: Node) -> bool {
        self.attrs[n].routing
    }

    /// Sorted neighbor list of `n`.
    #[inline]
    pub fn neighbors(&self, n: Node) -> &[Node] {
        &self.adj[n]
    }

    #[inline]
    pub fn has_link(&self, u: Node, v: Node) -> bool {
        self.cap.contains_key(&ukey(u, v))
    }

    /// Capacity of the (undirected) link between `u` and `v`; 0 if absent.
    #[inline]
    pub fn capacity(&self, u: Node, v: Node) -> f64 {
        self.cap.get(&ukey(u, v)).copied().unwrap_or(0.0)
    }

    /// Capacity bit pattern, used where exact equality matters (symmetry).
    #[inline]
    pub fn capacity_bits(&self, u: Node, v: Node) -> u64 {
        self.capacity(u, v).to_bits()
    }

    /// Undirected links as sorted `(u, v)` pairs with `u < v`.
    pub fn ulinks(&self) -> Vec<(Node, Node)> {
        let mut links: Vec<_> = self.cap.keys().copied().collect();
        links.sort_unstable();
        links
    }

    /// Directed links (both orientations of every undirected link), sorted.
    pub fn dlinks(&self) -> Vec<DLink> {
        let mut links = Vec::with_capacity(2 * self.cap.len());
        for &(u, v) in self.cap.keys() {
            links.push((u, v));
            links.push((v, u));
        }
        links.sort_unstable();
        links
    }

    /// Nodes with attached servers, sorted.
    pub fn host_nodes(&self) -> Vec<Node> {
        (0..self.num_nodes()).filter(|&n| self.attrs[n].hosts > 0).collect()
    }

    /// Nodes that may not carry transit traffic, sorted.
    pub fn non_routing_nodes(&self) -> Vec<Node> {
        (0..self.num_nodes()).filter(|&n| !self.attrs[n].routing).collect()
    }

    /// All ordered pairs of distinct host nodes, sorted.
    pub fn commodities(&self) -> Vec<Commodity> {
        let hosts = self.host_nodes();
        hosts
            .iter()
            .cartesian_product(hosts.iter())
            .map(|(&s, &d)| (s, d))
            .filter(|(s, d)| s != d)
            .collect()
    }

    /// SHA-256 over the canonical encoding of attributes and links.
    ///
    /// Stable across runs; used as the symmetry-cache key.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut h = Sha256::new();
        h.update(b"OROUTE:TOPO:v1");
        h.update((self.num_nodes() as u64).to_le_bytes());
        for a in &self.attrs {
            h.update(a.hosts.to_le_bytes());
            h.update([a.routing as u8]);
        }
        let links = self.ulinks();
        h.update((links.len() as u64).to_le_bytes());
        for (u, v) in links {
            h.update((u as u64).to_le_bytes());
            h.update((v as u64).to_le_bytes());
            h.update(self.capacity_bits(u, v).to_le_bytes());
        }
        Fingerprint(h.finalize().into())
    }
}

#[inline]
fn ukey(u: Node, v: Node) -> (Node, Node) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// Incremental topology constructor.
///
/// Parallel links accumulate capacity rather than erroring, matching the
/// reference generators (a 2-node ring is a doubled link).
#[derive(Clone, Debug)]
pub struct TopologyBuilder {
    name: String,
    attrs: Vec<NodeAttrs>,
    links: Vec<(Node, Node, f64)>,
}

impl TopologyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, hosts: u32, routing: bool) -> Node {
        self.attrs.push(NodeAttrs { hosts, routing });
        self.attrs.len() - 1
    }

    /// Add an undirected link; repeated `(u, v)` links sum their capacities.
    pub fn add_link(&mut self, u: Node, v: Node, capacity: f64) -> &mut Self {
        self.links.push((u, v, capacity));
        self
    }

    pub fn build(self) -> Result<Topology, TopologyError> {
        let n = self.attrs.len();
        if n == 0 {
            return Err(TopologyError::Empty);
        }
        let mut cap: HashMap<(Node, Node), f64> = HashMap::new();
        for (u, v, c) in self.links {
            if u >= n || v >= n {
                return Err(TopologyError::UnknownNode { node: u.max(v) });
            }
            if u == v {
                return Err(TopologyError::SelfLoop { node: u });
            }
            if !(c.is_finite() && c > 0.0) {
                return Err(TopologyError::BadCapacity { u, v, capacity: c });
            }
            *cap.entry(ukey(u, v)).or_insert(0.0) += c;
        }
        let mut adj: Vec<Vec<Node>> = vec![Vec::new(); n];
        for &(u, v) in cap.keys() {
            adj[u].push(v);
            adj[v].push(u);
        }
        for nbrs in &mut adj {
            nbrs.sort_unstable();
        }
        // Connectivity by BFS from node 0.
        let mut seen = vec![false; n];
        let mut queue = vec![0];
        seen[0] = true;
        while let Some(u) = queue.pop() {
            for &v in &adj[u] {
                if !seen[v] {
                    seen[v] = true;
                    queue.push(v);
                }
            }
        }
        if seen.iter().any(|s| !s) {
            return Err(TopologyError::Disconnected);
        }
        if self.attrs.iter().filter(|a| a.hosts > 0).count() < 2 {
            return Err(TopologyError::TooFewHosts);
        }
        Ok(Topology {
            name: self.name,
            attrs: self.attrs,
            adj,
            cap,
        })
    }
}
