//! Two-snapshot schedule comparison
//!
//! Runs the CPM engine independently on a baseline and a current network and
//! reports which activities were added, removed or moved. Activities are
//! matched purely by id, so both snapshots must be keyed by durable
//! activity codes.

use crate::config::AnalysisConfig;
use crate::cpm::{self, CpmEngine};
use crate::error::Result;
use crate::types::{CpmResult, ProjectNetwork};
use serde::Serialize;

const DELTA_EPSILON: f64 = 1e-9;

/// Date movement of one activity present in both snapshots
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMovement {
    pub id: String,
    pub name: String,
    pub start_delta: f64,
    pub finish_delta: f64,
    pub float_delta: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub added_ids: Vec<String>,
    pub removed_ids: Vec<String>,
    /// Moved activities, largest absolute finish movement first
    pub movements: Vec<ActivityMovement>,
    /// |critical ∩| / |critical ∪| x 100, rounded
    pub critical_path_overlap_percent: u32,
    /// Activities finishing later than in the baseline
    pub slipped_count: usize,
    /// Activities finishing earlier than in the baseline
    pub recovered_count: usize,
    pub baseline_finish: f64,
    pub current_finish: f64,
}

impl ComparisonResult {
    /// The `n` most-slipped activities
    pub fn top_slipped(&self, n: usize) -> Vec<&ActivityMovement> {
        self.movements
            .iter()
            .filter(|m| m.finish_delta > DELTA_EPSILON)
            .take(n)
            .collect()
    }
}

/// Holds both snapshots and their CPM results
#[derive(Debug, Clone)]
pub struct ScheduleComparator<'a> {
    pub(crate) baseline_network: &'a ProjectNetwork,
    pub(crate) current_network: &'a ProjectNetwork,
    pub(crate) baseline: CpmResult,
    pub(crate) current: CpmResult,
}

impl<'a> ScheduleComparator<'a> {
    /// Compare with default settings; cyclic snapshots are scheduled best-effort
    pub fn new(baseline: &'a ProjectNetwork, current: &'a ProjectNetwork) -> Self {
        Self {
            baseline_network: baseline,
            current_network: current,
            baseline: cpm::calculate(baseline),
            current: cpm::calculate(current),
        }
    }

    pub fn with_config(
        baseline: &'a ProjectNetwork,
        current: &'a ProjectNetwork,
        config: AnalysisConfig,
    ) -> Result<Self> {
        let engine = CpmEngine::with_config(config);
        Ok(Self {
            baseline_network: baseline,
            current_network: current,
            baseline: engine.run(baseline)?,
            current: engine.run(current)?,
        })
    }

    pub fn baseline(&self) -> &CpmResult {
        &self.baseline
    }

    pub fn current(&self) -> &CpmResult {
        &self.current
    }

    pub fn compare(&self) -> ComparisonResult {
        let mut added_ids = Vec::new();
        let mut movements = Vec::new();

        for cur in &self.current.activities {
            let Some(base) = self.baseline.get(&cur.id) else {
                added_ids.push(cur.id.clone());
                continue;
            };

            let movement = ActivityMovement {
                id: cur.id.clone(),
                name: cur.name.clone(),
                start_delta: cur.early_start - base.early_start,
                finish_delta: cur.early_finish - base.early_finish,
                float_delta: cur.total_float - base.total_float,
            };
            let moved = [movement.start_delta, movement.finish_delta, movement.float_delta]
                .iter()
                .any(|d| d.abs() > DELTA_EPSILON);
            if moved {
                movements.push(movement);
            }
        }

        let removed_ids: Vec<String> = self
            .baseline
            .activities
            .iter()
            .filter(|a| !self.current.contains(&a.id))
            .map(|a| a.id.clone())
            .collect();

        movements.sort_by(|a, b| b.finish_delta.abs().total_cmp(&a.finish_delta.abs()));

        let slipped_count = movements.iter().filter(|m| m.finish_delta > DELTA_EPSILON).count();
        let recovered_count = movements.iter().filter(|m| m.finish_delta < -DELTA_EPSILON).count();

        let result = ComparisonResult {
            added_ids,
            removed_ids,
            movements,
            critical_path_overlap_percent: self.critical_path_overlap(),
            slipped_count,
            recovered_count,
            baseline_finish: self.baseline.project_finish(),
            current_finish: self.current.project_finish(),
        };

        tracing::debug!(
            added = result.added_ids.len(),
            removed = result.removed_ids.len(),
            moved = result.movements.len(),
            overlap = result.critical_path_overlap_percent,
            "schedule comparison complete"
        );
        result
    }

    /// Jaccard overlap of the two critical sets; two empty sets overlap fully
    fn critical_path_overlap(&self) -> u32 {
        let current = self.current.critical_ids();
        let baseline = self.baseline.critical_ids();
        let union = current.union(&baseline).count();
        if union == 0 {
            return 100;
        }
        let shared = current.intersection(&baseline).count();
        (100.0 * shared as f64 / union as f64).round() as u32
    }
}

/// Compare two snapshots with default settings
pub fn compare(baseline: &ProjectNetwork, current: &ProjectNetwork) -> ComparisonResult {
    ScheduleComparator::new(baseline, current).compare()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, Relationship};

    fn network(acts: &[(&str, f64)], rels: &[(&str, &str)]) -> ProjectNetwork {
        ProjectNetwork::new(
            acts.iter().map(|(id, d)| Activity::new(*id, *id, *d)).collect(),
            rels.iter().map(|(p, s)| Relationship::fs(*p, *s)).collect(),
        )
    }

    #[test]
    fn test_identity() {
        let net = network(&[("A", 5.0), ("B", 3.0), ("C", 2.0)], &[("A", "B"), ("B", "C")]);
        let result = compare(&net, &net);
        assert!(result.added_ids.is_empty());
        assert!(result.removed_ids.is_empty());
        assert!(result.movements.is_empty());
        assert_eq!(result.critical_path_overlap_percent, 100);
    }

    #[test]
    fn test_added_removed_and_ranking() {
        let baseline = network(
            &[("A", 5.0), ("B", 3.0), ("C", 2.0), ("OLD", 1.0)],
            &[("A", "B"), ("B", "C")],
        );
        let current = network(
            &[("A", 7.0), ("B", 3.0), ("C", 2.0), ("NEW", 1.0)],
            &[("A", "B"), ("B", "C")],
        );
        let result = compare(&baseline, &current);

        assert_eq!(result.added_ids, ["NEW"]);
        assert_eq!(result.removed_ids, ["OLD"]);
        let ids: Vec<&str> = result.movements.iter().map(|m| m.id.as_str()).collect();
        // A, B and C all finish 2 days later; stable order keeps network order
        assert_eq!(ids, ["A", "B", "C"]);
        assert_eq!(result.movements[0].finish_delta, 2.0);
        assert_eq!(result.movements[1].start_delta, 2.0);
        assert_eq!(result.slipped_count, 3);
        assert_eq!(result.current_finish - result.baseline_finish, 2.0);
        assert_eq!(result.top_slipped(1).len(), 1);
    }

    #[test]
    fn test_float_only_movement_is_reported() {
        let baseline = network(&[("A", 5.0), ("B", 1.0)], &[]);
        let current = network(&[("A", 8.0), ("B", 1.0)], &[]);
        let result = compare(&baseline, &current);
        // A finishes 3 later; B keeps its dates but gains 3 days float
        assert_eq!(result.movements.len(), 2);
        assert_eq!(result.movements[0].id, "A");
        assert_eq!(result.movements[1].id, "B");
        assert_eq!(result.movements[1].finish_delta, 0.0);
        assert_eq!(result.movements[1].float_delta, 3.0);
        assert_eq!(result.recovered_count, 0);
    }

    #[test]
    fn test_critical_overlap() {
        // Baseline critical: A, B. Current: A, C
        let baseline = network(&[("A", 5.0), ("B", 5.0), ("C", 1.0)], &[("A", "B"), ("A", "C")]);
        let current = network(&[("A", 5.0), ("B", 1.0), ("C", 5.0)], &[("A", "B"), ("A", "C")]);
        let result = compare(&baseline, &current);
        // |{A}| / |{A, B, C}| = 33%
        assert_eq!(result.critical_path_overlap_percent, 33);
    }

    #[test]
    fn test_empty_networks() {
        let empty = ProjectNetwork::default();
        let result = compare(&empty, &empty);
        assert_eq!(result.critical_path_overlap_percent, 100);
        assert_eq!(result.baseline_finish, 0.0);
    }
}
