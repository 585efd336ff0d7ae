// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn tags(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn empty_job_tags_match_any_node() {
    let node = Node::new("n1", 1, tags(&["linux"]));
    assert!(node.can_queue(&BTreeSet::new()));
}

#[test]
fn disjoint_tags_do_not_match() {
    let node = Node::new("n1", 1, tags(&["linux"]));
    assert!(!node.can_queue(&tags(&["gpu"])));
}

#[test]
fn intersecting_tags_match() {
    let node = Node::new("n1", 1, tags(&["linux", "gpu"]));
    assert!(node.can_queue(&tags(&["gpu"])));
}

#[test]
fn saturated_node_cannot_queue_even_with_matching_tags() {
    let mut node = Node::new("n1", 1, BTreeSet::new());
    node.occupy();
    assert!(!node.can_queue(&BTreeSet::new()));
}

#[test]
fn occupy_then_release_restores_capacity() {
    let mut node = Node::new("n1", 1, BTreeSet::new());
    node.occupy();
    assert_eq!(node.busy_executors, 1);
    node.release();
    assert_eq!(node.busy_executors, 0);
    assert!(node.can_queue(&BTreeSet::new()));
}

#[test]
fn release_saturates_at_zero() {
    let mut node = Node::new("n1", 2, BTreeSet::new());
    node.release();
    assert_eq!(node.busy_executors, 0);
}
