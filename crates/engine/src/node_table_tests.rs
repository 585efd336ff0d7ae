use super::*;
use laminar_core::Node;

fn tags(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn finds_first_node_in_configuration_order_that_matches() {
    let mut table = NodeTable::from_nodes([
        Node::new("n1", 1, tags(&["slow"])),
        Node::new("n2", 1, tags(&[])),
    ]);
    let found = table.find_available(&BTreeSet::new()).expect("n1 should match");
    assert_eq!(found.name, "n1");
}

#[test]
fn skips_full_nodes() {
    let mut table = NodeTable::from_nodes([Node::new("n1", 1, tags(&[]))]);
    table.get_mut("n1").unwrap().occupy();
    assert!(table.find_available(&BTreeSet::new()).is_none());
}

#[test]
fn tag_mismatch_excludes_a_node() {
    let mut table = NodeTable::from_nodes([Node::new("n1", 1, tags(&["gpu"]))]);
    assert!(table.find_available(&tags(&["arm"])).is_none());
}
