//! CPM (Critical Path Method) calculation engine
//!
//! Implements forward pass, backward pass, float calculation, critical path
//! marking and driving-predecessor chain extraction. All dates are day
//! offsets from an implicit project start at 0.

use crate::config::AnalysisConfig;
use crate::error::{Result, ScheduleError};
use crate::network::NetworkGraph;
use crate::types::{
    ChainLink, CpmResult, CpmStats, ProjectNetwork, RelationType, ScheduledActivity,
};
use std::collections::{HashMap, HashSet};

/// Working record for one activity while the passes run
#[derive(Clone, Debug)]
struct Node {
    duration: f64,
    early_start: f64,
    early_finish: f64,
    late_start: f64,
    late_finish: f64,
    total_float: f64,
    free_float: f64,
    is_critical: bool,
    driving: Option<(usize, RelationType)>,
}

impl Node {
    fn new(duration: f64) -> Self {
        Self {
            duration,
            early_start: 0.0,
            early_finish: duration,
            late_start: 0.0,
            late_finish: 0.0,
            total_float: 0.0,
            free_float: 0.0,
            is_critical: false,
            driving: None,
        }
    }
}

/// Forward pass - calculate Early Start (ES) and Early Finish (EF)
///
/// The first predecessor producing the maximum candidate is recorded as driving.
fn forward_pass(graph: &NetworkGraph, nodes: &mut [Node], index: &HashMap<&str, usize>) {
    for id in graph.topological_order() {
        let i = index[id.as_str()];
        let duration = nodes[i].duration;
        let mut best: Option<(f64, usize, RelationType)> = None;

        for pred in graph.predecessors_of(id) {
            let Some(&p) = index.get(pred.id.as_str()) else {
                continue;
            };
            let candidate = match pred.relation_type {
                RelationType::FinishToStart => nodes[p].early_finish + pred.lag,
                RelationType::StartToStart => nodes[p].early_start + pred.lag,
                RelationType::FinishToFinish => nodes[p].early_finish + pred.lag - duration,
                RelationType::StartToFinish => nodes[p].early_start + pred.lag - duration,
            };

            // Take the maximum (latest) start from all predecessors
            if best.map_or(true, |(current, _, _)| candidate > current) {
                best = Some((candidate, p, pred.relation_type));
            }
        }

        let node = &mut nodes[i];
        node.early_start = best.map_or(0.0, |(es, _, _)| es);
        node.early_finish = node.early_start + duration;
        node.driving = best.map(|(_, p, rel)| (p, rel));
    }
}

/// Project finish = latest early finish (0 for an empty network)
fn project_finish(nodes: &[Node]) -> f64 {
    nodes
        .iter()
        .map(|n| n.early_finish)
        .fold(None, |max: Option<f64>, ef| Some(max.map_or(ef, |m| m.max(ef))))
        .unwrap_or(0.0)
}

/// Backward pass - calculate Late Start (LS) and Late Finish (LF)
fn backward_pass(
    graph: &NetworkGraph,
    nodes: &mut [Node],
    index: &HashMap<&str, usize>,
    project_finish: f64,
) {
    // Activities without successors keep the project finish
    for node in nodes.iter_mut() {
        node.late_finish = project_finish;
        node.late_start = project_finish - node.duration;
    }

    for id in graph.topological_order().iter().rev() {
        let i = index[id.as_str()];
        let duration = nodes[i].duration;
        let mut min_late_finish: Option<f64> = None;

        for succ in graph.successors_of(id) {
            let Some(&s) = index.get(succ.id.as_str()) else {
                continue;
            };
            let candidate = match succ.relation_type {
                RelationType::FinishToStart => nodes[s].late_start - succ.lag,
                RelationType::StartToStart => nodes[s].late_start - succ.lag + duration,
                RelationType::FinishToFinish => nodes[s].late_finish - succ.lag,
                RelationType::StartToFinish => nodes[s].late_finish - succ.lag + duration,
            };

            // Take the minimum (earliest) late finish from all successors
            if min_late_finish.map_or(true, |current| candidate < current) {
                min_late_finish = Some(candidate);
            }
        }

        let node = &mut nodes[i];
        node.late_finish = min_late_finish.unwrap_or(project_finish);
        node.late_start = node.late_finish - duration;
    }
}

/// Calculate Total Float and Free Float for all activities
///
/// Free float only considers Finish-to-Start successors; without any, it
/// equals total float.
fn calculate_float(graph: &NetworkGraph, nodes: &mut [Node], index: &HashMap<&str, usize>) {
    for id in graph.topological_order() {
        let i = index[id.as_str()];
        let total_float = nodes[i].late_start - nodes[i].early_start;
        let early_finish = nodes[i].early_finish;

        let min_free_float = graph
            .successors_of(id)
            .iter()
            .filter(|succ| succ.relation_type == RelationType::FinishToStart)
            .filter_map(|succ| {
                index
                    .get(succ.id.as_str())
                    .map(|&s| nodes[s].early_start - early_finish - succ.lag)
            })
            .fold(None, |min: Option<f64>, ff| Some(min.map_or(ff, |m| m.min(ff))));

        let node = &mut nodes[i];
        node.total_float = total_float;
        node.free_float = min_free_float.map_or(total_float, |ff| ff.max(0.0));
    }
}

/// Mark critical path based on Total Float
fn mark_critical_path(nodes: &mut [Node], tolerance: f64) {
    for node in nodes.iter_mut() {
        node.is_critical = node.total_float.abs() <= tolerance;
    }
}

/// CPM engine; one `run` per network, no state shared between runs
#[derive(Debug, Clone, Default)]
pub struct CpmEngine {
    config: AnalysisConfig,
}

impl CpmEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Main CPM calculation
    ///
    /// Cyclic networks produce best-effort dates unless `reject_cycles` is set.
    pub fn run(&self, network: &ProjectNetwork) -> Result<CpmResult> {
        // Step 1: Build adjacency and topological order
        let graph = NetworkGraph::build(network);

        if self.config.reject_cycles && graph.has_cycles() {
            return Err(ScheduleError::CyclicDependency {
                ids: graph.cyclic_ids().to_vec(),
            });
        }

        Ok(self.compute(network, graph))
    }

    fn compute(&self, network: &ProjectNetwork, graph: NetworkGraph) -> CpmResult {
        // Step 2: One working node per distinct activity, in input order
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(network.activities.len());
        let mut sources = Vec::with_capacity(network.activities.len());
        for activity in &network.activities {
            if index.contains_key(activity.id.as_str()) {
                continue;
            }
            index.insert(activity.id.as_str(), sources.len());
            sources.push(activity);
        }
        let mut nodes: Vec<Node> = sources.iter().map(|a| Node::new(a.duration_days)).collect();

        // Step 3: Forward pass
        forward_pass(&graph, &mut nodes, &index);
        let finish = project_finish(&nodes);

        // Step 4: Backward pass
        backward_pass(&graph, &mut nodes, &index, finish);

        // Step 5: Float values
        calculate_float(&graph, &mut nodes, &index);

        // Step 6: Critical path
        mark_critical_path(&mut nodes, self.config.critical_tolerance);

        let activities: Vec<ScheduledActivity> = sources
            .iter()
            .zip(&nodes)
            .map(|(activity, node)| ScheduledActivity {
                id: activity.id.clone(),
                name: activity.name.clone(),
                duration_days: node.duration,
                early_start: node.early_start,
                early_finish: node.early_finish,
                late_start: node.late_start,
                late_finish: node.late_finish,
                total_float: node.total_float,
                free_float: node.free_float,
                is_critical: node.is_critical,
                driving_predecessor_id: node.driving.map(|(p, _)| sources[p].id.clone()),
                driving_relation_type: node.driving.map(|(_, rel)| rel),
            })
            .collect();

        let critical_count = activities.iter().filter(|a| a.is_critical).count();
        let stats = CpmStats {
            activity_count: activities.len(),
            critical_count,
            relationship_count: graph.valid_relationship_count(),
            dropped_relationships: graph.dropped_relationship_count(),
            project_finish: finish,
            cyclic_activity_ids: graph.cyclic_ids().to_vec(),
        };

        tracing::debug!(
            activities = stats.activity_count,
            critical = stats.critical_count,
            project_finish = stats.project_finish,
            "CPM complete"
        );

        let index = activities
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();

        CpmResult {
            activities,
            stats,
            index,
            graph,
            max_chain_depth: self.config.max_chain_depth,
        }
    }
}

/// Best-effort CPM with default settings; never fails
pub fn calculate(network: &ProjectNetwork) -> CpmResult {
    CpmEngine::new().compute(network, NetworkGraph::build(network))
}

impl CpmResult {
    pub fn get(&self, id: &str) -> Option<&ScheduledActivity> {
        self.index.get(id).map(|&i| &self.activities[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn project_finish(&self) -> f64 {
        self.stats.project_finish
    }

    /// Adjacency and order the passes ran on
    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn critical_ids(&self) -> HashSet<&str> {
        self.activities
            .iter()
            .filter(|a| a.is_critical)
            .map(|a| a.id.as_str())
            .collect()
    }

    /// Driving-predecessor chain, queried activity first
    pub fn driving_chain(&self, id: &str) -> Result<Vec<ChainLink>> {
        self.driving_chain_limited(id, self.max_chain_depth)
    }

    /// Walk driving predecessors upstream for at most `max_depth` links
    ///
    /// Stops at an activity without a driving predecessor or when an id
    /// repeats.
    pub fn driving_chain_limited(&self, id: &str, max_depth: usize) -> Result<Vec<ChainLink>> {
        let mut current = self
            .get(id)
            .ok_or_else(|| ScheduleError::ActivityNotFound(id.to_string()))?;

        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut relation: Option<RelationType> = None;

        while chain.len() < max_depth {
            visited.insert(current.id.as_str());
            chain.push(ChainLink {
                id: current.id.clone(),
                name: current.name.clone(),
                early_start: current.early_start,
                early_finish: current.early_finish,
                late_start: current.late_start,
                late_finish: current.late_finish,
                total_float: current.total_float,
                relation_type: relation,
            });

            let Some(pred_id) = current.driving_predecessor_id.as_deref() else {
                break;
            };
            if visited.contains(pred_id) {
                break;
            }
            let Some(pred) = self.get(pred_id) else {
                break;
            };
            relation = current.driving_relation_type;
            current = pred;
        }

        Ok(chain)
    }
}
