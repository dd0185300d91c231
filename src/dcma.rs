//! Schedule quality assessment (DCMA 14-point check)
//!
//! Each check measures one metric over the whole network and grades it
//! against a fixed threshold. Checks that the input data cannot support are
//! reported as INFO and count as neither passed nor warned.

use crate::config::AnalysisConfig;
use crate::cpm::CpmEngine;
use crate::date_utils::{format_date, is_past};
use crate::error::Result;
use crate::types::{
    Activity, ActivityStatus, CpmResult, ProjectNetwork, RelationType, Relationship,
    ScheduledActivity,
};
use chrono::NaiveDate;
use serde::Serialize;

const CHECK_COUNT: usize = 14;
const FLOAT_EPSILON: f64 = 1e-9;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
    Info,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceBand {
    Compliant,
    Marginal,
    NonCompliant,
}

impl ComplianceBand {
    fn from_passed(passed: usize) -> Self {
        match passed {
            12.. => Self::Compliant,
            10..=11 => Self::Marginal,
            _ => Self::NonCompliant,
        }
    }
}

/// Result of one check
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcmaCheck {
    /// 1..=14
    pub id: u8,
    pub name: String,
    pub threshold_description: String,
    /// Percent for ratio checks, index value for checks 13 and 14
    pub actual_value: f64,
    pub status: CheckStatus,
    pub detail: String,
    /// Activities (or "pred->succ" relationship keys) that failed the metric
    pub affected_ids: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcmaReport {
    pub checks: Vec<DcmaCheck>,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    /// round(100 * (passed + 0.5 * warned) / 14)
    pub score: u32,
    pub band: ComplianceBand,
}

impl DcmaReport {
    fn from_checks(checks: Vec<DcmaCheck>) -> Self {
        let count = |status: CheckStatus| checks.iter().filter(|c| c.status == status).count();
        let passed = count(CheckStatus::Pass);
        let warned = count(CheckStatus::Warning);
        let failed = count(CheckStatus::Fail);
        let score = (100.0 * (passed as f64 + 0.5 * warned as f64) / CHECK_COUNT as f64).round();

        Self {
            checks,
            passed,
            warned,
            failed,
            score: score.clamp(0.0, 100.0) as u32,
            band: ComplianceBand::from_passed(passed),
        }
    }

    pub fn check(&self, id: u8) -> Option<&DcmaCheck> {
        self.checks.iter().find(|c| c.id == id)
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// PASS below `pass_below`, WARNING below `warn_below`, FAIL otherwise
fn grade_percent(value: f64, pass_below: f64, warn_below: f64) -> CheckStatus {
    if value < pass_below {
        CheckStatus::Pass
    } else if value < warn_below {
        CheckStatus::Warning
    } else {
        CheckStatus::Fail
    }
}

/// PASS at or above `pass_at`, WARNING at or above `warn_at`, FAIL otherwise
fn grade_index(value: f64, pass_at: f64, warn_at: f64) -> CheckStatus {
    if value >= pass_at {
        CheckStatus::Pass
    } else if value >= warn_at {
        CheckStatus::Warning
    } else {
        CheckStatus::Fail
    }
}

/// Percentage check over a population with a graded threshold
struct RatioCheck<'a> {
    id: u8,
    name: &'a str,
    noun: &'a str,
    pass_below: f64,
    warn_below: f64,
}

impl RatioCheck<'_> {
    fn evaluate(&self, affected: Vec<String>, population: usize, what: &str) -> DcmaCheck {
        let value = percent(affected.len(), population);
        let (status, threshold_description) = if self.pass_below == self.warn_below {
            (
                if affected.is_empty() { CheckStatus::Pass } else { CheckStatus::Fail },
                "0% pass, otherwise fail".to_string(),
            )
        } else {
            (
                grade_percent(value, self.pass_below, self.warn_below),
                format!("<{}% pass, <{}% warning", self.pass_below, self.warn_below),
            )
        };

        DcmaCheck {
            id: self.id,
            name: self.name.to_string(),
            threshold_description,
            actual_value: value,
            status,
            detail: format!(
                "{} of {} {} ({:.1}%) {}",
                affected.len(),
                population,
                self.noun,
                value,
                what
            ),
            affected_ids: affected,
        }
    }
}

fn ids_where(rows: &[Row<'_>], pred: impl Fn(&Row<'_>) -> bool) -> Vec<String> {
    rows.iter().filter(|r| pred(r)).map(|r| r.raw.id.clone()).collect()
}

/// Schedule quality analyzer
#[derive(Debug, Clone, Default)]
pub struct ScheduleQualityAnalyzer {
    config: AnalysisConfig,
}

/// Raw activity joined with its CPM output and logic counts
struct Row<'a> {
    raw: &'a Activity,
    total_float: f64,
    has_predecessors: bool,
    has_successors: bool,
}

impl ScheduleQualityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run CPM and all fourteen checks
    pub fn analyze(&self, network: &ProjectNetwork, data_date: NaiveDate) -> Result<DcmaReport> {
        let cpm = CpmEngine::with_config(self.config.clone()).run(network)?;
        Ok(self.analyze_with(network, &cpm, data_date))
    }

    /// Run all fourteen checks against an existing CPM result
    pub fn analyze_with(
        &self,
        network: &ProjectNetwork,
        cpm: &CpmResult,
        data_date: NaiveDate,
    ) -> DcmaReport {
        let graph = cpm.graph();
        let raw = network.activity_map();
        let rows: Vec<Row<'_>> = cpm
            .activities
            .iter()
            .filter_map(|s| {
                raw.get(s.id.as_str()).map(|&a| Row {
                    raw: a,
                    total_float: s.total_float,
                    has_predecessors: !graph.predecessors_of(&s.id).is_empty(),
                    has_successors: !graph.successors_of(&s.id).is_empty(),
                })
            })
            .collect();
        let relationships: Vec<_> = network
            .relationships
            .iter()
            .filter(|r| graph.contains(&r.predecessor_id) && graph.contains(&r.successor_id))
            .collect();
        let rel_key = |r: &&Relationship| format!("{}->{}", r.predecessor_id, r.successor_id);

        let mut checks = Vec::with_capacity(CHECK_COUNT);

        // 1. Missing predecessors
        let population: Vec<&Row<'_>> = rows
            .iter()
            .filter(|r| !r.raw.is_start_milestone(r.has_predecessors))
            .collect();
        let affected = population
            .iter()
            .filter(|r| !r.has_predecessors)
            .map(|r| r.raw.id.clone())
            .collect();
        checks.push(
            RatioCheck {
                id: 1,
                name: "Missing predecessors",
                noun: "activities",
                pass_below: 5.0,
                warn_below: 10.0,
            }
            .evaluate(affected, population.len(), "have no predecessor"),
        );

        // 2. Missing successors
        let population: Vec<&Row<'_>> = rows
            .iter()
            .filter(|r| !r.raw.is_finish_milestone(r.has_successors))
            .collect();
        let affected = population
            .iter()
            .filter(|r| !r.has_successors)
            .map(|r| r.raw.id.clone())
            .collect();
        checks.push(
            RatioCheck {
                id: 2,
                name: "Missing successors",
                noun: "activities",
                pass_below: 5.0,
                warn_below: 10.0,
            }
            .evaluate(affected, population.len(), "have no successor"),
        );

        // 3. Leads
        let affected = relationships.iter().filter(|r| r.lag < 0.0).map(rel_key).collect();
        checks.push(
            RatioCheck {
                id: 3,
                name: "Leads",
                noun: "relationships",
                pass_below: 0.0,
                warn_below: 0.0,
            }
            .evaluate(affected, relationships.len(), "carry a negative lag"),
        );

        // 4. Lags
        let affected = relationships.iter().filter(|r| r.lag > 0.0).map(rel_key).collect();
        checks.push(
            RatioCheck {
                id: 4,
                name: "Lags",
                noun: "relationships",
                pass_below: 5.0,
                warn_below: 15.0,
            }
            .evaluate(affected, relationships.len(), "carry a positive lag"),
        );

        // 5. Relationship types
        let affected = relationships
            .iter()
            .filter(|r| r.relation_type != RelationType::FinishToStart)
            .map(rel_key)
            .collect();
        checks.push(
            RatioCheck {
                id: 5,
                name: "Relationship types",
                noun: "relationships",
                pass_below: 10.0,
                warn_below: 20.0,
            }
            .evaluate(affected, relationships.len(), "are not Finish-to-Start"),
        );

        // 6. Hard constraints
        let affected = ids_where(&rows, |r| r.raw.constraint_kind.is_hard());
        checks.push(
            RatioCheck {
                id: 6,
                name: "Hard constraints",
                noun: "activities",
                pass_below: 5.0,
                warn_below: 10.0,
            }
            .evaluate(affected, rows.len(), "carry a hard constraint"),
        );

        // 7. High float
        let high_float = self.config.high_float_days;
        let affected = ids_where(&rows, |r| r.total_float > high_float);
        checks.push(
            RatioCheck {
                id: 7,
                name: "High float",
                noun: "activities",
                pass_below: 5.0,
                warn_below: 10.0,
            }
            .evaluate(
                affected,
                rows.len(),
                &format!("have more than {high_float} days of total float"),
            ),
        );

        // 8. Negative float
        let affected = ids_where(&rows, |r| r.total_float < -FLOAT_EPSILON);
        checks.push(
            RatioCheck {
                id: 8,
                name: "Negative float",
                noun: "activities",
                pass_below: 0.0,
                warn_below: 0.0,
            }
            .evaluate(affected, rows.len(), "have negative total float"),
        );

        // 9. High duration
        let long_duration = self.config.long_duration_days;
        let affected = ids_where(&rows, |r| r.raw.duration_days > long_duration);
        checks.push(
            RatioCheck {
                id: 9,
                name: "High duration",
                noun: "activities",
                pass_below: 5.0,
                warn_below: 10.0,
            }
            .evaluate(affected, rows.len(), &format!("last longer than {long_duration} days")),
        );

        // 10. Invalid dates
        let affected = ids_where(&rows, |r| {
            (r.raw.status == ActivityStatus::Complete && r.raw.actual_finish.is_none())
                || (r.raw.status == ActivityStatus::NotStarted && r.raw.actual_start.is_some())
        });
        let mut invalid = RatioCheck {
            id: 10,
            name: "Invalid dates",
            noun: "activities",
            pass_below: 0.0,
            warn_below: 0.0,
        }
        .evaluate(affected, rows.len(), "have actual dates inconsistent with their status");
        if invalid.status == CheckStatus::Fail {
            invalid.status = CheckStatus::Warning;
        }
        invalid.threshold_description = "0% pass, otherwise warning".to_string();
        checks.push(invalid);

        // 11. Resources
        checks.push(DcmaCheck {
            id: 11,
            name: "Resources".to_string(),
            threshold_description: "informational".to_string(),
            actual_value: 0.0,
            status: CheckStatus::Info,
            detail: "resource loading cannot be assessed without a resource assignment table"
                .to_string(),
            affected_ids: Vec::new(),
        });

        // 12. Missed tasks
        let incomplete: Vec<&Row<'_>> = rows.iter().filter(|r| !r.raw.is_complete()).collect();
        let affected = incomplete
            .iter()
            .filter(|r| r.raw.finish.map_or(false, |f| is_past(f, data_date)))
            .map(|r| r.raw.id.clone())
            .collect();
        checks.push(
            RatioCheck {
                id: 12,
                name: "Missed tasks",
                noun: "incomplete activities",
                pass_below: 5.0,
                warn_below: 15.0,
            }
            .evaluate(
                affected,
                incomplete.len(),
                &format!("should have finished before {}", format_date(data_date)),
            ),
        );

        // 13. Critical path length index
        checks.push(Self::critical_path_length_index(cpm));

        // 14. Baseline execution index
        checks.push(Self::baseline_execution_index(&rows, data_date));

        let report = DcmaReport::from_checks(checks);
        tracing::debug!(
            passed = report.passed,
            warned = report.warned,
            failed = report.failed,
            score = report.score,
            "DCMA assessment complete"
        );
        report
    }

    /// CPLI = (project duration + reference float) / project duration, with
    /// the latest-finishing activity as reference
    fn critical_path_length_index(cpm: &CpmResult) -> DcmaCheck {
        let threshold_description = ">=1.0 pass, >=0.95 warning".to_string();
        let project_start = cpm
            .activities
            .iter()
            .map(|a| a.early_start)
            .fold(None, |min: Option<f64>, es| Some(min.map_or(es, |m| m.min(es))))
            .unwrap_or(0.0);
        let duration = cpm.project_finish() - project_start;

        let mut reference: Option<&ScheduledActivity> = None;
        for id in cpm.graph().topological_order() {
            if let Some(a) = cpm.get(id) {
                if reference.map_or(true, |r| a.early_finish > r.early_finish) {
                    reference = Some(a);
                }
            }
        }

        let Some(reference) = reference.filter(|_| duration > FLOAT_EPSILON) else {
            return DcmaCheck {
                id: 13,
                name: "Critical path length index".to_string(),
                threshold_description,
                actual_value: 0.0,
                status: CheckStatus::Info,
                detail: "project duration is zero; index not computable".to_string(),
                affected_ids: Vec::new(),
            };
        };

        let cpli = (duration + reference.total_float) / duration;
        let status = grade_index(cpli + FLOAT_EPSILON, 1.0, 0.95);
        DcmaCheck {
            id: 13,
            name: "Critical path length index".to_string(),
            threshold_description,
            actual_value: cpli,
            status,
            detail: format!(
                "CPLI {:.3} (duration {:.1} days, float {:.1} on {})",
                cpli, duration, reference.total_float, reference.id
            ),
            affected_ids: if status == CheckStatus::Pass {
                Vec::new()
            } else {
                vec![reference.id.clone()]
            },
        }
    }

    /// BEI = completed activities / activities whose planned finish has passed
    fn baseline_execution_index(rows: &[Row<'_>], data_date: NaiveDate) -> DcmaCheck {
        let threshold_description = ">=0.95 pass, >=0.85 warning".to_string();
        let due: Vec<&Row<'_>> = rows
            .iter()
            .filter(|r| r.raw.finish.map_or(false, |f| is_past(f, data_date)))
            .collect();
        let completed = rows.iter().filter(|r| r.raw.is_complete()).count();

        if due.is_empty() {
            return DcmaCheck {
                id: 14,
                name: "Baseline execution index".to_string(),
                threshold_description,
                actual_value: 0.0,
                status: CheckStatus::Info,
                detail: format!("no activity was due before {}", format_date(data_date)),
                affected_ids: Vec::new(),
            };
        }

        let bei = completed as f64 / due.len() as f64;
        DcmaCheck {
            id: 14,
            name: "Baseline execution index".to_string(),
            threshold_description,
            actual_value: bei,
            status: grade_index(bei, 0.95, 0.85),
            detail: format!("BEI {:.2} ({} complete / {} due)", bei, completed, due.len()),
            affected_ids: due
                .iter()
                .filter(|r| !r.raw.is_complete())
                .map(|r| r.raw.id.clone())
                .collect(),
        }
    }
}

/// DCMA assessment with default thresholds and best-effort CPM
pub fn run_dcma(network: &ProjectNetwork, data_date: NaiveDate) -> DcmaReport {
    let cpm = crate::cpm::calculate(network);
    ScheduleQualityAnalyzer::new().analyze_with(network, &cpm, data_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConstraintKind, Relationship};

    fn date(s: &str) -> NaiveDate {
        crate::date_utils::parse_date(s).unwrap()
    }

    /// Start milestone -> A -> B -> C -> finish milestone
    fn clean_network() -> ProjectNetwork {
        ProjectNetwork::new(
            vec![
                Activity::new("MS", "Start", 0.0),
                Activity::new("A", "Design", 5.0),
                Activity::new("B", "Build", 10.0),
                Activity::new("C", "Test", 3.0),
                Activity::new("MF", "Finish", 0.0),
            ],
            vec![
                Relationship::fs("MS", "A"),
                Relationship::fs("A", "B"),
                Relationship::fs("B", "C"),
                Relationship::fs("C", "MF"),
            ],
        )
    }

    #[test]
    fn test_clean_network() {
        let report = run_dcma(&clean_network(), date("2024-01-01"));
        assert_eq!(report.checks.len(), 14);
        for id in 1..=10 {
            assert_eq!(report.check(id).unwrap().status, CheckStatus::Pass, "check {id}");
        }
        assert_eq!(report.check(11).unwrap().status, CheckStatus::Info);
        assert_eq!(report.check(12).unwrap().status, CheckStatus::Pass);
        assert_eq!(report.check(13).unwrap().status, CheckStatus::Pass);
        assert_eq!(report.check(13).unwrap().actual_value, 1.0);
        // No dates -> nothing due
        assert_eq!(report.check(14).unwrap().status, CheckStatus::Info);
        assert_eq!(report.passed, 12);
        assert_eq!(report.score, 86);
        assert_eq!(report.band, ComplianceBand::Compliant);
    }

    #[test]
    fn test_missing_logic() {
        let mut network = clean_network();
        network.activities.push(Activity::new("X", "Orphan", 2.0));
        let report = run_dcma(&network, date("2024-01-01"));

        // 1 of 5 non-start-milestone activities
        let missing_preds = report.check(1).unwrap();
        assert_eq!(missing_preds.actual_value, 20.0);
        assert_eq!(missing_preds.status, CheckStatus::Fail);
        assert_eq!(missing_preds.affected_ids, ["X"]);
        assert_eq!(report.check(2).unwrap().status, CheckStatus::Fail);
    }

    #[test]
    fn test_relationship_checks() {
        let mut network = clean_network();
        network.relationships[1].lag = -1.0;
        network.relationships[2].lag = 2.0;
        network.relationships[3].relation_type = RelationType::StartToStart;
        let report = run_dcma(&network, date("2024-01-01"));

        assert_eq!(report.check(3).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.check(3).unwrap().affected_ids, ["A->B"]);
        assert_eq!(report.check(4).unwrap().actual_value, 25.0);
        assert_eq!(report.check(4).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.check(5).unwrap().status, CheckStatus::Fail);
    }

    #[test]
    fn test_constraint_float_and_duration_checks() {
        let mut network = clean_network();
        network.activities[1].constraint_kind = ConstraintKind::MustStartOn;
        network.activities[2].duration_days = 60.0;
        network.activities.push(Activity::new("LONGFLOAT", "Loose", 1.0));
        network.relationships.push(Relationship::fs("MS", "LONGFLOAT"));
        network.relationships.push(Relationship::fs("LONGFLOAT", "MF"));
        let report = run_dcma(&network, date("2024-01-01"));

        assert_eq!(report.check(6).unwrap().affected_ids, ["A"]);
        assert_eq!(report.check(6).unwrap().status, CheckStatus::Fail);
        assert_eq!(report.check(7).unwrap().affected_ids, ["LONGFLOAT"]);
        assert_eq!(report.check(9).unwrap().affected_ids, ["B"]);
        assert_eq!(report.check(8).unwrap().status, CheckStatus::Pass);
    }

    #[test]
    fn test_no_later_than_constraints_are_hard() {
        let activities = (0..10).map(|i| Activity::new(format!("A{i}"), "Step", 2.0)).collect();
        let relationships =
            (1..10).map(|i| Relationship::fs(format!("A{}", i - 1), format!("A{i}"))).collect();
        let mut network = ProjectNetwork::new(activities, relationships);
        network.activities[3].constraint_kind = ConstraintKind::StartNoLaterThan;
        network.activities[5].constraint_kind = ConstraintKind::FinishNoLaterThan;

        let hard = run_dcma(&network, date("2024-01-01")).check(6).unwrap().clone();
        assert_eq!(hard.actual_value, 20.0);
        assert_eq!(hard.status, CheckStatus::Fail);
        assert_eq!(hard.affected_ids, ["A3", "A5"]);
    }

    /// Two activities waiting on each other
    fn loop_network(first: f64, second: f64) -> ProjectNetwork {
        ProjectNetwork::new(
            vec![Activity::new("A", "First", first), Activity::new("B", "Second", second)],
            vec![Relationship::fs("A", "B"), Relationship::fs("B", "A")],
        )
    }

    #[test]
    fn test_cycle_yields_negative_float_and_short_cpli() {
        // A: 3..5, B: 5..8, both with -2 days of float
        let report = run_dcma(&loop_network(2.0, 3.0), date("2024-01-01"));

        let negative = report.check(8).unwrap();
        assert_eq!(negative.actual_value, 100.0);
        assert_eq!(negative.status, CheckStatus::Fail);
        assert_eq!(negative.affected_ids, ["A", "B"]);

        // (5 - 2) / 5
        let cpli = report.check(13).unwrap();
        assert_eq!(cpli.actual_value, 0.6);
        assert_eq!(cpli.status, CheckStatus::Fail);
        assert_eq!(cpli.affected_ids, ["B"]);
    }

    #[test]
    fn test_cpli_warning_band() {
        // Duration 40 with -1 day of float on the finishing activity
        let report = run_dcma(&loop_network(1.0, 39.0), date("2024-01-01"));
        let cpli = report.check(13).unwrap();
        assert_eq!(cpli.actual_value, 0.975);
        assert_eq!(cpli.status, CheckStatus::Warning);
        assert_eq!(cpli.affected_ids, ["B"]);
    }

    #[test]
    fn test_invalid_dates_warn() {
        let mut network = clean_network();
        network.activities[1].status = ActivityStatus::Complete;
        network.activities[2].status = ActivityStatus::NotStarted;
        network.activities[2].actual_start = Some(date("2024-01-03"));
        let check = run_dcma(&network, date("2024-01-01")).check(10).unwrap().clone();
        assert_eq!(check.status, CheckStatus::Warning);
        assert_eq!(check.affected_ids, ["A", "B"]);
    }

    #[test]
    fn test_missed_tasks_and_bei() {
        let mut network = clean_network();
        network.activities[1].finish = Some(date("2024-01-05"));
        network.activities[1].status = ActivityStatus::Complete;
        network.activities[1].actual_finish = Some(date("2024-01-05"));
        network.activities[2].finish = Some(date("2024-01-15"));
        network.activities[2].status = ActivityStatus::InProgress;
        network.activities[3].finish = Some(date("2024-03-01"));
        let report = run_dcma(&network, date("2024-02-01"));

        let missed = report.check(12).unwrap();
        assert_eq!(missed.affected_ids, ["B"]);
        assert_eq!(missed.status, CheckStatus::Fail);

        let bei = report.check(14).unwrap();
        assert_eq!(bei.actual_value, 0.5);
        assert_eq!(bei.status, CheckStatus::Fail);
        assert_eq!(bei.affected_ids, ["B"]);
    }

    #[test]
    fn test_empty_network() {
        let report = run_dcma(&ProjectNetwork::default(), date("2024-01-01"));
        assert_eq!(report.checks.len(), 14);
        assert_eq!(report.check(13).unwrap().status, CheckStatus::Info);
        assert!(report.score <= 100);
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ComplianceBand::from_passed(14), ComplianceBand::Compliant);
        assert_eq!(ComplianceBand::from_passed(12), ComplianceBand::Compliant);
        assert_eq!(ComplianceBand::from_passed(11), ComplianceBand::Marginal);
        assert_eq!(ComplianceBand::from_passed(10), ComplianceBand::Marginal);
        assert_eq!(ComplianceBand::from_passed(9), ComplianceBand::NonCompliant);
    }

    #[test]
    fn test_report_serializes() {
        let report = run_dcma(&clean_network(), date("2024-01-01"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["band"], "COMPLIANT");
        assert_eq!(json["checks"][10]["status"], "INFO");
        assert!(json["checks"][0]["thresholdDescription"].is_string());
    }
}
