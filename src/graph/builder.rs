// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipexport contributors

//! Invocation graph builder
//!
//! Links invocations through the datasets they exchange and prunes the
//! graph backward from a terminal invocation to the minimal set of steps
//! that contributed to it.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use tracing::{debug, info};

use crate::errors::{ExportError, ExportResult};
use crate::model::{DatasetKey, DatasetRef, InvocationRecord, InvocationResult};

/// Dependency graph between logged invocations
pub struct GraphBuilder<'a> {
    records: &'a [InvocationRecord],
    results: &'a [InvocationResult],
    graph: DiGraph<usize, DatasetKey>,
    /// Node per record position; duplicates share their first occurrence's node
    nodes: Vec<NodeIndex>,
    /// First equal occurrence of each record position
    canonical: Vec<usize>,
    /// Producing invocation of every output dataset
    producers: HashMap<DatasetKey, usize>,
}

impl<'a> GraphBuilder<'a> {
    /// Build the graph for a list of invocations and their results
    pub fn build(
        records: &'a [InvocationRecord],
        results: &'a [InvocationResult],
    ) -> ExportResult<Self> {
        if records.len() != results.len() {
            return Err(ExportError::RecordResultMismatch {
                records: records.len(),
                results: results.len(),
            });
        }
        if records.is_empty() {
            return Err(ExportError::EmptyRequest);
        }

        let canonical = Self::fold_duplicates(records, results);
        let mut graph = DiGraph::new();
        let mut nodes = Vec::with_capacity(records.len());

        for (idx, &first) in canonical.iter().enumerate() {
            if first == idx {
                nodes.push(graph.add_node(idx));
            } else {
                debug!(invocation = idx, duplicate_of = first, "folding repeated invocation");
                nodes.push(nodes[first]);
            }
        }

        let mut builder = Self {
            records,
            results,
            graph,
            nodes,
            canonical,
            producers: HashMap::new(),
        };

        builder.index_producers()?;
        builder.link_consumers();
        builder.validate_acyclic()?;

        debug!(
            invocations = builder.graph.node_count(),
            edges = builder.graph.edge_count(),
            "built invocation graph"
        );

        Ok(builder)
    }

    /// Map every record position to the first identical record/result pair
    fn fold_duplicates(records: &[InvocationRecord], results: &[InvocationResult]) -> Vec<usize> {
        let mut canonical = Vec::with_capacity(records.len());
        for idx in 0..records.len() {
            let first = (0..idx)
                .find(|&j| canonical[j] == j && records[j] == records[idx] && results[j] == results[idx])
                .unwrap_or(idx);
            canonical.push(first);
        }
        canonical
    }

    fn is_canonical(&self, idx: usize) -> bool {
        self.canonical[idx] == idx
    }

    /// Record which invocation produced each output dataset
    fn index_producers(&mut self) -> ExportResult<()> {
        for idx in 0..self.records.len() {
            if !self.is_canonical(idx) {
                continue;
            }

            for output in &self.results[idx].outputs {
                let key = output.key();
                match self.producers.get(&key) {
                    Some(&first) if first != idx => {
                        return Err(ExportError::AmbiguousLineage {
                            key: key.to_string(),
                            first,
                            second: idx,
                        });
                    }
                    Some(_) => {}
                    None => {
                        self.producers.insert(key, idx);
                    }
                }
            }
        }
        Ok(())
    }

    /// Add producer → consumer edges for every produced input
    fn link_consumers(&mut self) {
        for idx in 0..self.records.len() {
            if !self.is_canonical(idx) {
                continue;
            }

            for input in &self.records[idx].inputs {
                let key = input.key();
                if let Some(&producer) = self.producers.get(&key) {
                    let from = self.nodes[producer];
                    let to = self.nodes[idx];
                    if !self.graph.contains_edge(from, to) {
                        self.graph.add_edge(from, to, key);
                    }
                }
            }
        }
    }

    /// Validate that no invocation consumes its own or a descendant's output
    fn validate_acyclic(&self) -> ExportResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(_) => Err(ExportError::CyclicLineage {
                invocations: self.cycle_members(),
            }),
        }
    }

    /// Invocations on the first cycle found, closed back to the start
    fn cycle_members(&self) -> Vec<usize> {
        for component in tarjan_scc(&self.graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| self.graph.contains_edge(n, n));
            if is_cycle {
                let mut members: Vec<usize> = component.iter().map(|&n| self.graph[n]).collect();
                members.sort_unstable();
                members.push(members[0]);
                return members;
            }
        }
        Vec::new()
    }

    /// Prune backward from `terminal` to the invocations it depends on
    pub fn prune(&self, terminal: usize) -> ExportResult<ExportGraph<'a>> {
        if terminal >= self.records.len() {
            return Err(ExportError::InvalidTerminal {
                index: terminal,
                len: self.records.len(),
            });
        }
        let records: &'a [InvocationRecord] = self.records;
        let terminal = self.canonical[terminal];

        let mut discovery = vec![terminal];
        let mut included: HashSet<usize> = HashSet::from([terminal]);
        let mut external: Vec<&'a DatasetRef> = Vec::new();
        let mut seen_keys: HashSet<DatasetKey> = HashSet::new();

        // Frontier of (consumer, needed dataset), in first-discovery order
        let mut frontier: VecDeque<(usize, &'a DatasetRef)> = records[terminal]
            .inputs
            .iter()
            .map(|ds| (terminal, ds))
            .collect();

        while let Some((consumer, dataset)) = frontier.pop_front() {
            let key = dataset.key();
            if !seen_keys.insert(key.clone()) {
                continue;
            }

            match self.producers.get(&key) {
                Some(&producer) => {
                    if included.insert(producer) {
                        debug!(
                            invocation = producer,
                            component = %records[producer],
                            "including upstream invocation"
                        );
                        discovery.push(producer);
                        frontier.extend(records[producer].inputs.iter().map(|ds| (producer, ds)));
                    }
                }
                None if dataset.is_placeholder() => {
                    return Err(ExportError::UnresolvedDependency {
                        invocation: consumer,
                        dataset: dataset.name.clone(),
                    });
                }
                None => {
                    debug!(dataset = %key, "treating unproduced dataset as raw input");
                    external.push(dataset);
                }
            }
        }

        let order = self.topological_subset(&included);
        let pruned = self.records.len() - self.canonical.iter().filter(|&&c| included.contains(&c)).count();

        info!(
            terminal,
            included = order.len(),
            pruned,
            external_inputs = external.len(),
            "pruned invocation graph"
        );

        Ok(ExportGraph {
            records,
            results: self.results,
            terminal,
            order,
            discovery,
            external,
        })
    }

    /// Topological order of a node subset, ties broken by record position
    fn topological_subset(&self, subset: &HashSet<usize>) -> Vec<usize> {
        let mut in_degree: HashMap<usize, usize> = subset.iter().map(|&i| (i, 0)).collect();
        for &idx in subset {
            for pred in self.graph.neighbors_directed(self.nodes[idx], Direction::Incoming) {
                if subset.contains(&self.graph[pred]) {
                    *in_degree.entry(idx).or_default() += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&i, _)| Reverse(i))
            .collect();
        let mut order = Vec::with_capacity(subset.len());

        while let Some(Reverse(idx)) = ready.pop() {
            order.push(idx);
            for succ in self.graph.neighbors_directed(self.nodes[idx], Direction::Outgoing) {
                let succ = self.graph[succ];
                if let Some(degree) = in_degree.get_mut(&succ) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(succ));
                    }
                }
            }
        }

        order
    }

    /// Invocations whose outputs `idx` consumes
    pub fn dependencies(&self, idx: usize) -> Vec<usize> {
        let node = self.nodes[self.canonical[idx]];
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Invocations that consume outputs of `idx`
    pub fn dependents(&self, idx: usize) -> Vec<usize> {
        let node = self.nodes[self.canonical[idx]];
        let mut deps: Vec<usize> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }

    /// Positions that repeat an earlier invocation
    pub fn duplicates(&self) -> Vec<usize> {
        (0..self.canonical.len()).filter(|&i| !self.is_canonical(i)).collect()
    }

    /// Position of the first identical invocation
    pub fn canonical(&self, idx: usize) -> usize {
        self.canonical[idx]
    }

    /// All distinct edges as (producer, consumer, dataset) in record order
    pub fn edges(&self) -> Vec<(usize, usize, &DatasetKey)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some((self.graph[from], self.graph[to], &self.graph[e]))
            })
            .collect();
        edges.sort_by_key(|&(from, to, _)| (from, to));
        edges
    }

    pub fn records(&self) -> &'a [InvocationRecord] {
        self.records
    }
}

/// Minimal subgraph contributing to a terminal invocation
#[derive(Debug, Clone)]
pub struct ExportGraph<'a> {
    records: &'a [InvocationRecord],
    results: &'a [InvocationResult],
    terminal: usize,
    /// Included invocations, producers before consumers
    order: Vec<usize>,
    /// Included invocations in backward discovery order
    discovery: Vec<usize>,
    /// Unproduced datasets consumed by included invocations
    external: Vec<&'a DatasetRef>,
}

impl<'a> ExportGraph<'a> {
    pub fn terminal(&self) -> usize {
        self.terminal
    }

    /// Included record positions in topological order
    pub fn included(&self) -> &[usize] {
        &self.order
    }

    /// Included record positions in the order pruning reached them
    pub fn discovery_order(&self) -> &[usize] {
        &self.discovery
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.order.contains(&idx)
    }

    /// Included invocations with their results, in topological order
    pub fn steps(&self) -> impl Iterator<Item = (usize, &'a InvocationRecord, &'a InvocationResult)> + '_ {
        self.order
            .iter()
            .map(move |&i| (i, &self.records[i], &self.results[i]))
    }

    /// Datasets consumed by included invocations but produced by none of them
    pub fn external_inputs(&self) -> &[&'a DatasetRef] {
        &self.external
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
