//! Rule-grouping data model.

use thiserror::Error;

use crate::topo::{Commodity, DLink, Node};

/// Grouping knobs.
#[derive(Clone, Debug)]
pub struct RuleCfg {
    /// Split-ratio granularity. Fractions are rounded to integer multiples
    /// of this quantum before comparison, so a coarser quantum merges more
    /// commodities into fewer rules.
    pub weight_quantum: f64,
    /// Per-node rule budget. `None` disables the overflow check.
    pub table_capacity: Option<usize>,
}

impl Default for RuleCfg {
    fn default() -> Self {
        Self {
            weight_quantum: 1e-6,
            table_capacity: None,
        }
    }
}

/// One grouped forwarding entry: every matched commodity at `node` forwards
/// with the same quantized weighted-multipath action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardingRule {
    pub node: Node,
    /// Matched commodities, sorted.
    pub matches: Vec<Commodity>,
    /// Out-link weights in quantum buckets, sorted by link, no zero entries.
    pub action: Vec<(DLink, u64)>,
}

impl ForwardingRule {
    /// Action buckets renormalized to split fractions.
    pub fn fractions(&self) -> Vec<(DLink, f64)> {
        let total: u64 = self.action.iter().map(|&(_, b)| b).sum();
        self.action
            .iter()
            .map(|&(e, b)| (e, b as f64 / total as f64))
            .collect()
    }
}

/// The grouped table of a single node.
#[derive(Clone, Debug)]
pub struct NodeRules {
    pub node: Node,
    pub rules: Vec<ForwardingRule>,
    /// Commodities with outgoing flow at this node before grouping.
    pub matched: usize,
}

/// Table-size statistics across all nodes.
#[derive(Clone, Copy, Debug)]
pub struct GroupingStats {
    /// Grouped rules, summed over nodes.
    pub total_rules: usize,
    /// Ungrouped per-commodity entries, summed over nodes.
    pub total_matches: usize,
    /// Min/max/mean of the per-node grouped-to-ungrouped ratio, over nodes
    /// that match at least one commodity.
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub avg_ratio: f64,
    /// Distinct rule templates across node orbits.
    pub templates: usize,
}

#[derive(Clone, Debug)]
pub struct GroupedRules {
    pub per_node: Vec<NodeRules>,
    pub stats: GroupingStats,
}

impl GroupedRules {
    pub fn node(&self, n: Node) -> &NodeRules {
        &self.per_node[n]
    }
}

#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("rule table overflow at node {node}: {achieved} rules exceed capacity {capacity}")]
    Overflow {
        node: Node,
        achieved: usize,
        capacity: usize,
    },
}
