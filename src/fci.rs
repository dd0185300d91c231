//! Float Credibility Index (FCI)
//!
//! Scores every activity 0-100 on whether its computed float reflects real
//! slack or an artifact of constraints, open ends, lag abuse or a foreign
//! calendar. Each deduction is itemized so a reviewer can see why a score
//! is low.

use crate::config::AnalysisConfig;
use crate::cpm::CpmEngine;
use crate::error::Result;
use crate::types::{Activity, CpmResult, ProjectNetwork, RelationType, ScheduledActivity};
use serde::Serialize;
use std::collections::HashMap;

const HARD_CONSTRAINT_PENALTY: u32 = 35;
const SOFT_CONSTRAINT_PENALTY: u32 = 10;
const MAX_LAG_PENALTY: u32 = 25;
const LAG_PENALTY_PER_DAY: f64 = 1.5;
const OPEN_END_PENALTY: u32 = 25;
const NON_FS_RATIO_LIMIT: f64 = 0.6;
const NON_FS_PENALTY: u32 = 12;
const ISOLATED_PENALTY: u32 = 20;
const MAX_LAG_RATIO_PENALTY: u32 = 15;
const LAG_RATIO_PENALTY_FACTOR: f64 = 5.0;
const UPSTREAM_CONSTRAINT_LIMIT: usize = 2;
const MASKED_FLOAT_PENALTY: u32 = 15;
const CALENDAR_MISMATCH_PENALTY: u32 = 8;

const UNRELIABLE_BELOW: u32 = 40;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenaltyRule {
    HardConstraint,
    SoftConstraint,
    LagDays,
    OpenStart,
    OpenFinish,
    NonFinishToStart,
    Isolated,
    LagExceedsDuration,
    UpstreamConstraints,
    CalendarMismatch,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub rule: PenaltyRule,
    pub amount: u32,
    pub detail: String,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FciGrade {
    High,
    Medium,
    Low,
}

impl FciGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Self::High,
            50..=79 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FciResult {
    pub id: String,
    /// 0..=100
    pub score: u32,
    pub grade: FciGrade,
    pub penalties: Vec<Penalty>,
    pub total_float: f64,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FciSummary {
    pub activity_count: usize,
    pub average_score: f64,
    /// Scores below 40
    pub low_count: usize,
    /// Scores from 40 up to (not including) 80
    pub medium_count: usize,
    /// Scores of 80 and above
    pub high_count: usize,
    /// Percent of activities scoring below 40
    pub unreliable_float_percent: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FciReport {
    /// One entry per activity, in network order
    pub results: Vec<FciResult>,
    pub summary: FciSummary,
}

impl FciReport {
    pub fn get(&self, id: &str) -> Option<&FciResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// Most common calendar id; ties go to the first one seen
fn dominant_calendar(activities: &[Activity]) -> Option<&str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, cal) in activities.iter().filter_map(|a| a.calendar_id.as_deref()).enumerate() {
        counts.entry(cal).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(cal, _)| cal)
}

#[derive(Debug, Clone, Default)]
pub struct FloatCredibilityScorer {
    config: AnalysisConfig,
}

impl FloatCredibilityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, network: &ProjectNetwork) -> Result<FciReport> {
        let cpm = CpmEngine::with_config(self.config.clone()).run(network)?;
        Ok(self.score_with(network, &cpm))
    }

    pub fn score_with(&self, network: &ProjectNetwork, cpm: &CpmResult) -> FciReport {
        let raw = network.activity_map();
        let calendar = dominant_calendar(&network.activities);

        let results: Vec<FciResult> = cpm
            .activities
            .iter()
            .filter_map(|s| {
                raw.get(s.id.as_str())
                    .map(|&a| self.score_activity(a, s, cpm, &raw, calendar))
            })
            .collect();

        let summary = summarize(&results);
        tracing::debug!(
            activities = summary.activity_count,
            average = summary.average_score,
            unreliable_percent = summary.unreliable_float_percent,
            "FCI scoring complete"
        );

        FciReport { results, summary }
    }

    fn score_activity(
        &self,
        activity: &Activity,
        scheduled: &ScheduledActivity,
        cpm: &CpmResult,
        raw: &HashMap<&str, &Activity>,
        calendar: Option<&str>,
    ) -> FciResult {
        let graph = cpm.graph();
        let preds = graph.predecessors_of(&activity.id);
        let succs = graph.successors_of(&activity.id);
        let mut penalties: Vec<Penalty> = Vec::new();
        let mut add = |rule: PenaltyRule, amount: u32, detail: String| {
            if amount > 0 {
                penalties.push(Penalty { rule, amount, detail });
            }
        };

        // Constraints
        if activity.constraint_kind.is_hard() {
            add(
                PenaltyRule::HardConstraint,
                HARD_CONSTRAINT_PENALTY,
                format!("hard constraint {}", activity.constraint_kind.as_str()),
            );
        } else if activity.constraint_kind.is_soft() {
            add(
                PenaltyRule::SoftConstraint,
                SOFT_CONSTRAINT_PENALTY,
                format!("soft constraint {}", activity.constraint_kind.as_str()),
            );
        }

        // Lag on adjoining relationships
        let total_lag: f64 = preds.iter().chain(succs).map(|link| link.lag.abs()).sum();
        if total_lag > 0.0 {
            let amount = ((LAG_PENALTY_PER_DAY * total_lag).round() as u32).min(MAX_LAG_PENALTY);
            add(
                PenaltyRule::LagDays,
                amount,
                format!("{total_lag} days of lag on adjoining logic"),
            );
        }

        // Open ends
        if preds.is_empty() && !activity.is_start_milestone(false) {
            add(
                PenaltyRule::OpenStart,
                OPEN_END_PENALTY,
                "no predecessors (open start)".to_string(),
            );
        }
        if succs.is_empty() && !activity.is_finish_milestone(false) {
            add(
                PenaltyRule::OpenFinish,
                OPEN_END_PENALTY,
                "no successors (open finish)".to_string(),
            );
        }

        // Relationship mix
        let link_count = preds.len() + succs.len();
        let non_fs = preds
            .iter()
            .chain(succs)
            .filter(|link| link.relation_type != RelationType::FinishToStart)
            .count();
        if link_count > 0 && non_fs as f64 / link_count as f64 > NON_FS_RATIO_LIMIT {
            add(
                PenaltyRule::NonFinishToStart,
                NON_FS_PENALTY,
                format!("{non_fs} of {link_count} relationships are not Finish-to-Start"),
            );
        }

        if link_count == 0 {
            add(PenaltyRule::Isolated, ISOLATED_PENALTY, "no logic at all (isolated)".to_string());
        }

        // Lag versus own duration
        if activity.duration_days > 0.0 && total_lag > activity.duration_days {
            let ratio = total_lag / activity.duration_days;
            let amount =
                ((LAG_RATIO_PENALTY_FACTOR * ratio).round() as u32).min(MAX_LAG_RATIO_PENALTY);
            add(
                PenaltyRule::LagExceedsDuration,
                amount,
                format!("lag is {ratio:.1}x the activity duration"),
            );
        }

        // Float masked by upstream constraints
        if scheduled.total_float > self.config.fci_float_masking_days {
            let upstream = self.upstream_hard_constraints(&activity.id, cpm, raw);
            if upstream >= UPSTREAM_CONSTRAINT_LIMIT {
                add(
                    PenaltyRule::UpstreamConstraints,
                    MASKED_FLOAT_PENALTY,
                    format!("float likely masked by {upstream} upstream hard constraints"),
                );
            }
        }

        // Calendar
        if let (Some(own), Some(dominant)) = (activity.calendar_id.as_deref(), calendar) {
            if own != dominant {
                add(
                    PenaltyRule::CalendarMismatch,
                    CALENDAR_MISMATCH_PENALTY,
                    format!("calendar {own} differs from project calendar {dominant}"),
                );
            }
        }

        let deducted: u32 = penalties.iter().map(|p| p.amount).sum();
        let score = 100u32.saturating_sub(deducted);

        FciResult {
            id: activity.id.clone(),
            score,
            grade: FciGrade::from_score(score),
            penalties,
            total_float: scheduled.total_float,
        }
    }

    /// Count hard-constrained activities along the driving chain upstream of `id`
    fn upstream_hard_constraints(
        &self,
        id: &str,
        cpm: &CpmResult,
        raw: &HashMap<&str, &Activity>,
    ) -> usize {
        let Ok(chain) = cpm.driving_chain_limited(id, self.config.fci_upstream_depth + 1) else {
            return 0;
        };
        chain
            .iter()
            .skip(1)
            .filter(|link| {
                raw.get(link.id.as_str())
                    .map_or(false, |a| a.constraint_kind.is_hard())
            })
            .count()
    }
}

fn summarize(results: &[FciResult]) -> FciSummary {
    if results.is_empty() {
        return FciSummary::default();
    }

    let count = results.len();
    let total: u32 = results.iter().map(|r| r.score).sum();
    let low_count = results.iter().filter(|r| r.score < UNRELIABLE_BELOW).count();
    let high_count = results.iter().filter(|r| r.score >= 80).count();

    FciSummary {
        activity_count: count,
        average_score: total as f64 / count as f64,
        low_count,
        medium_count: count - low_count - high_count,
        high_count,
        unreliable_float_percent: 100.0 * low_count as f64 / count as f64,
    }
}

/// FCI scoring with default settings and best-effort CPM
pub fn compute_fci(network: &ProjectNetwork) -> FciReport {
    let cpm = crate::cpm::calculate(network);
    FloatCredibilityScorer::new().score_with(network, &cpm)
}
