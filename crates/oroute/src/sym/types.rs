//! Node permutations and automorphism verification.

use crate::topo::{DLink, Node, Topology};

/// A permutation of the topology's nodes, stored as an image table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Perm(Vec<Node>);

impl Perm {
    pub fn identity(n: usize) -> Self {
        Perm((0..n).collect())
    }

    /// Build from an image table. Callers must pass a bijection of `0..len`.
    pub fn from_images(images: Vec<Node>) -> Self {
        debug_assert!(is_bijection(&images));
        Perm(images)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn apply(&self, n: Node) -> Node {
        self.0[n]
    }

    #[inline]
    pub fn apply_pair(&self, (a, b): DLink) -> DLink {
        (self.0[a], self.0[b])
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &x)| i == x)
    }

    /// Composition `next ∘ self`: apply `self` first, then `next`.
    pub fn then(&self, next: &Perm) -> Perm {
        Perm(self.0.iter().map(|&i| next.0[i]).collect())
    }

    pub fn inverse(&self) -> Perm {
        let mut inv = vec![0; self.0.len()];
        for (i, &img) in self.0.iter().enumerate() {
            inv[img] = i;
        }
        Perm(inv)
    }

    /// Points moved by this permutation.
    pub fn support(&self) -> impl Iterator<Item = Node> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(i, &x)| i != x)
            .map(|(i, _)| i)
    }
}

fn is_bijection(images: &[Node]) -> bool {
    let mut seen = vec![false; images.len()];
    for &x in images {
        if x >= images.len() || seen[x] {
            return false;
        }
        seen[x] = true;
    }
    true
}

/// Check that `perm` preserves node attributes, adjacency and capacities.
///
/// This is the certification gate: only permutations passing it may enter an
/// orbit computation, so a heuristic search can never produce an unsound
/// (over-merged) partition.
pub fn verify_automorphism(topo: &Topology, perm: &Perm) -> bool {
    let n = topo.num_nodes();
    if perm.len() != n {
        return false;
    }
    for u in 0..n {
        if topo.attrs(u) != topo.attrs(perm.apply(u)) {
            return false;
        }
        let iu = perm.apply(u);
        if topo.neighbors(u).len() != topo.neighbors(iu).len() {
            return false;
        }
        for &v in topo.neighbors(u) {
            let iv = perm.apply(v);
            if !topo.has_link(iu, iv) {
                return false;
            }
            if topo.capacity_bits(u, v) != topo.capacity_bits(iu, iv) {
                return false;
            }
        }
    }
    true
}
