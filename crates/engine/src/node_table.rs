// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed set of executor pools a daemon instance was configured with.
//! Order is configuration order (`<home>/cfg/nodes/*.conf`, sorted by file
//! name at load time) and is preserved here because the scheduler scans
//! nodes in this order when looking for a free executor — determinism the
//! end-to-end scenarios in `spec.md` §8 rely on.

use indexmap::IndexMap;
use laminar_core::{Node, NodeName};
use std::collections::BTreeSet;

#[derive(Default)]
pub struct NodeTable {
    nodes: IndexMap<NodeName, Node>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut table = Self::new();
        for node in nodes {
            table.nodes.insert(node.name.clone(), node);
        }
        table
    }

    /// The first node, in configuration order, that can accept a job with
    /// the given tags.
    pub fn find_available(&mut self, job_tags: &BTreeSet<String>) -> Option<&mut Node> {
        self.nodes.values_mut().find(|node| node.can_queue(job_tags))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Applies a config reload (`spec.md` §6's `SIGHUP`-triggered reload):
    /// a node already present keeps its live `busy_executors` count (it
    /// may have runs in flight) but picks up the reloaded `num_executors`
    /// and `tags`; a node no longer present is dropped only once it is
    /// idle, since dropping it out from under an in-flight run would
    /// leave that run's completion unable to release an executor.
    pub fn reload(&mut self, new_nodes: impl IntoIterator<Item = Node>) {
        let mut next = IndexMap::new();
        for node in new_nodes {
            match self.nodes.swap_remove(&node.name) {
                Some(mut existing) => {
                    existing.num_executors = node.num_executors;
                    existing.tags = node.tags;
                    next.insert(existing.name.clone(), existing);
                }
                None => {
                    next.insert(node.name.clone(), node);
                }
            }
        }
        // Anything left in `self.nodes` was dropped from configuration.
        // Keep it around only while it still has runs in flight.
        for (name, node) in self.nodes.drain(..) {
            if node.busy_executors > 0 {
                next.insert(name, node);
            }
        }
        self.nodes = next;
    }
}

#[cfg(test)]
#[path = "node_table_tests.rs"]
mod tests;
