use super::*;

#[test]
fn builder_rejects_bad_inputs() {
    let mut b = TopologyBuilder::new("bad-cap");
    b.add_node(1, true);
    b.add_node(1, true);
    b.add_link(0, 1, 0.0);
    assert_eq!(
        b.build().unwrap_err(),
        TopologyError::BadCapacity { u: 0, v: 1, capacity: 0.0 }
    );

    let mut b = TopologyBuilder::new("self-loop");
    b.add_node(1, true);
    b.add_node(1, true);
    b.add_link(0, 0, 1.0);
    assert_eq!(b.build().unwrap_err(), TopologyError::SelfLoop { node: 0 });

    // Two components.
    let mut b = TopologyBuilder::new("disconnected");
    for _ in 0..4 {
        b.add_node(1, true);
    }
    b.add_link(0, 1, 1.0);
    b.add_link(2, 3, 1.0);
    assert_eq!(b.build().unwrap_err(), TopologyError::Disconnected);

    // Connected, but only one node hosts servers.
    let mut b = TopologyBuilder::new("one-host");
    b.add_node(1, true);
    b.add_node(0, true);
    b.add_link(0, 1, 1.0);
    assert_eq!(b.build().unwrap_err(), TopologyError::TooFewHosts);
}

#[test]
fn parallel_links_accumulate_capacity() {
    let mut b = TopologyBuilder::new("doubled");
    b.add_node(1, true);
    b.add_node(1, true);
    b.add_link(0, 1, 1.0);
    b.add_link(1, 0, 2.5);
    let t = b.build().unwrap();
    assert_eq!(t.capacity(0, 1), 3.5);
    assert_eq!(t.capacity(1, 0), 3.5);
    assert_eq!(t.ulinks(), vec![(0, 1)]);
    assert_eq!(t.dlinks(), vec![(0, 1), (1, 0)]);
}

#[test]
fn ring_views() {
    let t = gen::ring(6, 2, 1.0);
    assert_eq!(t.num_nodes(), 6);
    assert_eq!(t.ulinks().len(), 6);
    assert_eq!(t.dlinks().len(), 12);
    assert_eq!(t.host_nodes().len(), 6);
    assert_eq!(t.commodities().len(), 30);
    for n in 0..6 {
        assert_eq!(t.neighbors(n).len(), 2);
        assert_eq!(t.hosts(n), 2);
        assert!(t.is_routing(n));
    }
}

#[test]
fn commodities_skip_hostless_nodes() {
    // Path h - r - h where the middle node has no servers.
    let mut b = TopologyBuilder::new("path");
    let a = b.add_node(1, true);
    let m = b.add_node(0, true);
    let c = b.add_node(1, true);
    b.add_link(a, m, 1.0);
    b.add_link(m, c, 1.0);
    let t = b.build().unwrap();
    assert_eq!(t.commodities(), vec![(a, c), (c, a)]);
}

#[test]
fn fingerprint_is_stable_and_sensitive() {
    let t1 = gen::ring(5, 1, 1.0);
    let t2 = gen::ring(5, 1, 1.0);
    assert_eq!(t1.fingerprint(), t2.fingerprint());

    let cap = gen::ring(5, 1, 2.0);
    assert_ne!(t1.fingerprint(), cap.fingerprint());
    let hosts = gen::ring(5, 2, 1.0);
    assert_ne!(t1.fingerprint(), hosts.fingerprint());
    let bigger = gen::ring(6, 1, 1.0);
    assert_ne!(t1.fingerprint(), bigger.fingerprint());
}
