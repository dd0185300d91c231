//! Precedence network: adjacency lists and topological order
//!
//! Built once per CPM run from a flat activity list and relationship list.
//! Relationships that reference unknown activity ids are dropped silently.
//! Cycles are tolerated: activities Kahn's algorithm never releases are
//! appended after the resolvable ones in input order.

use crate::types::{ProjectNetwork, RelationType};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// One adjacency entry; `id` is the activity at the other end of the relationship
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentLink {
    pub id: String,
    pub relation_type: RelationType,
    pub lag: f64,
}

#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkGraph {
    predecessors_of: HashMap<String, Vec<AdjacentLink>>,
    successors_of: HashMap<String, Vec<AdjacentLink>>,
    order: Vec<String>,
    /// Activities never released by the topological sort (cycle members and
    /// everything downstream of them)
    cyclic_ids: Vec<String>,
    valid_relationships: usize,
    dropped_relationships: usize,
}

impl NetworkGraph {
    /// Build adjacency maps and the topological order
    pub fn build(network: &ProjectNetwork) -> Self {
        let mut graph = NetworkGraph::default();
        let mut insertion_order: Vec<String> = Vec::with_capacity(network.activities.len());

        // Initialize empty adjacency for all activities
        for activity in &network.activities {
            if graph.predecessors_of.contains_key(&activity.id) {
                tracing::warn!(id = %activity.id, "duplicate activity id ignored");
                continue;
            }
            graph.predecessors_of.insert(activity.id.clone(), Vec::new());
            graph.successors_of.insert(activity.id.clone(), Vec::new());
            insertion_order.push(activity.id.clone());
        }

        for rel in &network.relationships {
            let known = graph.predecessors_of.contains_key(&rel.predecessor_id)
                && graph.predecessors_of.contains_key(&rel.successor_id);
            if !known {
                graph.dropped_relationships += 1;
                continue;
            }

            if let Some(preds) = graph.predecessors_of.get_mut(&rel.successor_id) {
                preds.push(AdjacentLink {
                    id: rel.predecessor_id.clone(),
                    relation_type: rel.relation_type,
                    lag: rel.lag,
                });
            }
            if let Some(succs) = graph.successors_of.get_mut(&rel.predecessor_id) {
                succs.push(AdjacentLink {
                    id: rel.successor_id.clone(),
                    relation_type: rel.relation_type,
                    lag: rel.lag,
                });
            }
            graph.valid_relationships += 1;
        }

        if graph.dropped_relationships > 0 {
            tracing::warn!(
                dropped = graph.dropped_relationships,
                "relationships referencing unknown activities were dropped"
            );
        }

        graph.topological_sort(&insertion_order);
        graph
    }

    /// Kahn's algorithm; unresolved activities are appended in insertion order
    fn topological_sort(&mut self, insertion_order: &[String]) {
        let mut in_degree: HashMap<&str, usize> = insertion_order
            .iter()
            .map(|id| (id.as_str(), self.predecessors_of[id].len()))
            .collect();

        let mut queue: VecDeque<&str> = insertion_order
            .iter()
            .map(String::as_str)
            .filter(|id| in_degree[id] == 0)
            .collect();

        let mut order: Vec<String> = Vec::with_capacity(insertion_order.len());
        let mut placed: HashSet<&str> = HashSet::with_capacity(insertion_order.len());

        while let Some(id) = queue.pop_front() {
            order.push(id.to_string());
            placed.insert(id);

            for succ in &self.successors_of[id] {
                if let Some(degree) = in_degree.get_mut(succ.id.as_str()) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(succ.id.as_str());
                    }
                }
            }
        }

        let cyclic: Vec<String> = insertion_order
            .iter()
            .filter(|id| !placed.contains(id.as_str()))
            .cloned()
            .collect();

        if !cyclic.is_empty() {
            tracing::warn!(
                count = cyclic.len(),
                "network contains cycles; dates for these activities are best-effort"
            );
        }

        order.extend(cyclic.iter().cloned());
        self.order = order;
        self.cyclic_ids = cyclic;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.predecessors_of.contains_key(id)
    }

    pub fn predecessors_of(&self, id: &str) -> &[AdjacentLink] {
        self.predecessors_of.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn successors_of(&self, id: &str) -> &[AdjacentLink] {
        self.successors_of.get(id).map_or(&[], Vec::as_slice)
    }

    /// Every activity exactly once; cycle members last
    pub fn topological_order(&self) -> &[String] {
        &self.order
    }

    pub fn cyclic_ids(&self) -> &[String] {
        &self.cyclic_ids
    }

    pub fn has_cycles(&self) -> bool {
        !self.cyclic_ids.is_empty()
    }

    pub fn valid_relationship_count(&self) -> usize {
        self.valid_relationships
    }

    pub fn dropped_relationship_count(&self) -> usize {
        self.dropped_relationships
    }
}
