use std::time::Duration;

use super::*;
use crate::topo::{gen, TopologyBuilder};

fn zero_budget() -> SymCfg {
    SymCfg {
        budget: Duration::from_secs(0),
    }
}

#[test]
fn perm_compose_and_inverse() {
    let p = Perm::from_images(vec![1, 2, 0]); // rotation
    let q = Perm::from_images(vec![0, 2, 1]); // swap 1,2
    let pq = p.then(&q); // p first, then q
    assert_eq!(pq.apply(0), 2);
    assert_eq!(pq.apply(1), 1);
    assert_eq!(pq.apply(2), 0);
    assert!(p.then(&p.inverse()).is_identity());
    assert_eq!(p.apply_pair((0, 1)), (1, 2));
    assert_eq!(p.support().count(), 3);
}

#[test]
fn ring6_generators_are_verified_and_transitive() {
    let t = gen::ring(6, 1, 1.0);
    let outcome = find_generators(&t, &SymCfg::default());
    assert!(outcome.complete);
    assert!(!outcome.generators.is_empty());
    for g in &outcome.generators {
        assert!(verify_automorphism(&t, g));
    }
}

#[test]
fn ring6_orbit_partition_shapes() {
    let t = gen::ring(6, 1, 1.0);
    let p = OrbitPartition::detect(&t, &SymCfg::default());
    assert!(p.complete);
    // Vertex-transitive: one node orbit.
    assert_eq!(p.num_node_orbits(), 1);
    // Commodity orbits are the three distance classes, sized 12/12/6.
    assert_eq!(p.num_commodity_orbits(), 3);
    let mut sizes: Vec<usize> = p.commodity_orbits.iter().map(|o| o.members.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![6, 12, 12]);
    // Flow classes: distance-1 and distance-2 representatives have trivial
    // stabilizers (12 link classes each); the antipodal representative's
    // stabilizer is the axis reflection (6 classes).
    assert_eq!(p.num_flow_classes(), 30);
    // Certificate indices collapse to the host-stabilizer link orbits.
    assert_eq!(p.aux.reps.len(), 6);
    // All link constraints are equivalent on a uniform ring.
    assert_eq!(p.link_constrs.len(), 1);
}

#[test]
fn commodity_frames_map_representative_to_member() {
    let t = gen::ring(6, 1, 1.0);
    let p = OrbitPartition::detect(&t, &SymCfg::default());
    for orbit in &p.commodity_orbits {
        for &sd in &orbit.members {
            assert_eq!(orbit.frame(sd).apply_pair(orbit.rep), sd);
            // Inverse frame takes member coordinates back.
            let back = orbit.to_rep_frame(sd, sd);
            assert_eq!(back, orbit.rep);
        }
    }
}

#[test]
fn refinement_separates_degree_and_attribute_classes() {
    // Star of 3 leaves around a hub: refinement must split hub from leaves
    // even though all nodes start with identical attributes.
    let mut b = TopologyBuilder::new("star-3");
    for _ in 0..4 {
        b.add_node(1, true);
    }
    for leaf in 1..4 {
        b.add_link(0, leaf, 1.0);
    }
    let t = b.build().unwrap();
    let colors = stable_colors(&t);
    let classes = color_classes(&colors);
    assert_eq!(classes.len(), 2);
    assert!(classes.contains(&vec![0]));
    assert!(classes.contains(&vec![1, 2, 3]));
}

#[test]
fn path_graph_splits_ends_from_middle() {
    let mut b = TopologyBuilder::new("path-3");
    for _ in 0..3 {
        b.add_node(1, true);
    }
    b.add_link(0, 1, 1.0);
    b.add_link(1, 2, 1.0);
    let t = b.build().unwrap();
    let p = OrbitPartition::detect(&t, &SymCfg::default());
    assert_eq!(p.num_node_orbits(), 2);
    assert_eq!(p.node_orbits[p.node_orbit_of[0]], vec![0, 2]);
    assert_eq!(p.num_commodity_orbits(), 3);
}

#[test]
fn host_counts_restrict_symmetry() {
    // Ring of 4 where node 0 carries extra servers: 0 must be fixed, so the
    // surviving symmetry is the reflection through 0.
    let mut b = TopologyBuilder::new("ring4-marked");
    b.add_node(2, true);
    for _ in 0..3 {
        b.add_node(1, true);
    }
    for i in 0..4 {
        b.add_link(i, (i + 1) % 4, 1.0);
    }
    let t = b.build().unwrap();
    let p = OrbitPartition::detect(&t, &SymCfg::default());
    assert_eq!(p.num_node_orbits(), 3);
    assert_eq!(p.node_orbits[p.node_orbit_of[1]], vec![1, 3]);
    for g in &p.generators {
        assert_eq!(g.apply(0), 0);
    }
}

#[test]
fn capacities_restrict_symmetry() {
    // Square with one heavy link (3,0): automorphisms must keep it in place.
    let mut b = TopologyBuilder::new("ring4-heavy-link");
    for _ in 0..4 {
        b.add_node(1, true);
    }
    b.add_link(0, 1, 1.0);
    b.add_link(1, 2, 1.0);
    b.add_link(2, 3, 1.0);
    b.add_link(3, 0, 2.0);
    let t = b.build().unwrap();
    let p = OrbitPartition::detect(&t, &SymCfg::default());
    assert_eq!(p.num_node_orbits(), 2);
    for g in &p.generators {
        assert!(verify_automorphism(&t, g));
        assert_eq!(t.capacity(g.apply(3), g.apply(0)), 2.0);
    }
}

#[test]
fn zero_budget_degrades_to_trivial_partition() {
    let t = gen::ring(5, 1, 1.0);
    let p = OrbitPartition::detect(&t, &zero_budget());
    assert!(!p.complete);
    assert!(p.generators.is_empty());
    assert_eq!(p.num_node_orbits(), 5);
    assert_eq!(p.num_commodity_orbits(), t.commodities().len());
    assert_eq!(p.num_flow_classes(), t.commodities().len() * t.dlinks().len());
}

#[test]
fn trivial_partition_matches_full_problem_shape() {
    let t = gen::clique(4, 1, 1.0);
    let p = OrbitPartition::trivial(&t);
    assert_eq!(p.num_commodity_orbits(), 12);
    assert_eq!(p.num_flow_classes(), 12 * t.dlinks().len());
    assert_eq!(p.link_constrs.len(), t.dlinks().len());
}

#[test]
fn symmetry_cache_hits_and_invalidates() {
    let t = gen::ring(6, 1, 1.0);
    let mut cache = SymmetryCache::new();
    let a = cache.get_or_detect(&t, &SymCfg::default());
    let b = cache.get_or_detect(&t, &SymCfg::default());
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
    assert!(cache.invalidate(&t.fingerprint()));
    assert!(cache.is_empty());
}
