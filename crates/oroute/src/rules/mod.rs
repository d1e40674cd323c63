//! Forwarding-rule compression.
//!
//! Purpose: turn the expanded per-commodity routing into per-node weighted
//! multipath tables, merging commodities whose quantized split actions agree
//! so that switch table occupancy drops without changing forwarding
//! behavior. Grouping on the exact quantized signature preserves behavior
//! up to the chosen quantum and is idempotent.

mod group;
mod types;

pub use group::{group_rules, regroup};
pub use types::{ForwardingRule, GroupedRules, GroupingError, GroupingStats, NodeRules, RuleCfg};

#[cfg(test)]
mod tests;
