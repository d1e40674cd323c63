//! Grouping of per-commodity forwarding actions into shared rules.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::expand::RoutingSolution;
use crate::sym::OrbitPartition;
use crate::topo::{Commodity, DLink, Node, Topology};

use super::types::{ForwardingRule, GroupedRules, GroupingError, GroupingStats, NodeRules, RuleCfg};

type Signature = Vec<(DLink, u64)>;

/// Group the expanded routing into per-node forwarding rules.
///
/// Commodities at a node merge exactly when their quantized split actions
/// are identical, which is the unique maximal signature-preserving merge.
/// Returns `GroupingError::Overflow` when a node's grouped table exceeds
/// `cfg.table_capacity`; callers may coarsen the quantum and retry.
pub fn group_rules(
    topo: &Topology,
    orbits: &OrbitPartition,
    routing: &RoutingSolution,
    cfg: &RuleCfg,
) -> Result<GroupedRules, GroupingError> {
    let commodities = topo.commodities();
    let mut per_node = Vec::with_capacity(topo.num_nodes());

    for n in 0..topo.num_nodes() {
        let mut by_sig: BTreeMap<Signature, Vec<Commodity>> = BTreeMap::new();
        for &sd in &commodities {
            let fracs = routing.out_fractions(topo, sd, n);
            if fracs.is_empty() {
                continue;
            }
            by_sig.entry(quantize(&fracs, cfg.weight_quantum)).or_default().push(sd);
        }
        per_node.push(collect_node(n, by_sig, cfg)?);
    }

    let stats = compute_stats(&per_node, orbits);
    debug!(
        rules = stats.total_rules,
        matches = stats.total_matches,
        templates = stats.templates,
        "grouped forwarding rules"
    );
    Ok(GroupedRules { per_node, stats })
}

/// Re-run grouping on an already-grouped table, treating each rule's action
/// as the forwarding behavior of all its matches. With an unchanged quantum
/// this is the identity; with a coarser one it merges further.
pub fn regroup(
    orbits: &OrbitPartition,
    grouped: &GroupedRules,
    cfg: &RuleCfg,
) -> Result<GroupedRules, GroupingError> {
    let mut per_node = Vec::with_capacity(grouped.per_node.len());
    for node_rules in &grouped.per_node {
        let mut by_sig: BTreeMap<Signature, Vec<Commodity>> = BTreeMap::new();
        for rule in &node_rules.rules {
            let sig = quantize(&rule.fractions(), cfg.weight_quantum);
            by_sig.entry(sig).or_default().extend(rule.matches.iter().copied());
        }
        let mut rebuilt = collect_node(node_rules.node, by_sig, cfg)?;
        rebuilt.matched = node_rules.matched;
        per_node.push(rebuilt);
    }
    let stats = compute_stats(&per_node, orbits);
    Ok(GroupedRules { per_node, stats })
}

/// Round fractions into quantum buckets. A signature never comes out empty:
/// when every bucket rounds to zero the heaviest link keeps one bucket so
/// the rule still forwards.
fn quantize(fracs: &[(DLink, f64)], quantum: f64) -> Signature {
    let mut sig: Signature = fracs
        .iter()
        .map(|&(e, f)| (e, (f / quantum).round() as u64))
        .filter(|&(_, b)| b > 0)
        .collect();
    if sig.is_empty() {
        let &(e, _) = fracs
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(b.0.cmp(&a.0)))
            .unwrap();
        sig.push((e, 1));
    }
    sig
}

fn collect_node(
    node: Node,
    by_sig: BTreeMap<Signature, Vec<Commodity>>,
    cfg: &RuleCfg,
) -> Result<NodeRules, GroupingError> {
    let matched = by_sig.values().map(Vec::len).sum();
    let mut rules = Vec::with_capacity(by_sig.len());
    for (action, mut matches) in by_sig {
        matches.sort_unstable();
        matches.dedup();
        rules.push(ForwardingRule { node, matches, action });
    }
    if let Some(capacity) = cfg.table_capacity {
        if rules.len() > capacity {
            return Err(GroupingError::Overflow {
                node,
                achieved: rules.len(),
                capacity,
            });
        }
    }
    Ok(NodeRules { node, rules, matched })
}

fn compute_stats(per_node: &[NodeRules], orbits: &OrbitPartition) -> GroupingStats {
    let mut total_rules = 0;
    let mut total_matches = 0;
    let mut min_ratio = f64::INFINITY;
    let mut max_ratio = 0.0_f64;
    let mut ratio_sum = 0.0;
    let mut active_nodes = 0usize;
    let mut templates: HashSet<(usize, usize, Signature)> = HashSet::new();

    for nr in per_node {
        total_rules += nr.rules.len();
        total_matches += nr.matched;
        if nr.matched > 0 {
            let ratio = nr.rules.len() as f64 / nr.matched as f64;
            min_ratio = min_ratio.min(ratio);
            max_ratio = max_ratio.max(ratio);
            ratio_sum += ratio;
            active_nodes += 1;
        }
        for rule in &nr.rules {
            templates.insert(template_key(orbits, rule));
        }
    }

    if active_nodes == 0 {
        min_ratio = 0.0;
    }
    GroupingStats {
        total_rules,
        total_matches,
        min_ratio,
        max_ratio,
        avg_ratio: if active_nodes == 0 { 0.0 } else { ratio_sum / active_nodes as f64 },
        templates: templates.len(),
    }
}

/// Template identity of a rule: its node orbit plus the action rewritten in
/// the representative frame of the rule's smallest matched commodity. Rules
/// at different nodes that correspond under the automorphism group collapse
/// to the same key.
fn template_key(orbits: &OrbitPartition, rule: &ForwardingRule) -> (usize, usize, Signature) {
    let node_orbit = orbits.node_orbit_of[rule.node];
    let sd = rule.matches[0];
    let k = orbits.commodity_orbit_of[&sd];
    let orbit = &orbits.commodity_orbits[k];
    let rep_of = &orbits.flow_links[k].rep_of;
    let mut action: Signature = rule
        .action
        .iter()
        .map(|&(e, b)| (rep_of[&orbit.to_rep_frame(sd, e)], b))
        .collect();
    action.sort_unstable();
    (node_orbit, k, action)
}
