//! Push explanation: why did an activity move between two snapshots
//!
//! Reconstructs the activity's driving-predecessor chain in both snapshots,
//! diffs the raw attributes of every activity on the current chain and the
//! relationships touching it, then classifies the dominant cause.

use crate::compare::ScheduleComparator;
use crate::date_utils::format_date;
use crate::error::{Result, ScheduleError};
use crate::types::{Activity, ChainLink, ProjectNetwork, Relationship};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const MOVE_EPSILON: f64 = 1e-9;

const CONFIDENCE_DIRECT: u8 = 85;
const CONFIDENCE_INDIRECT: u8 = 65;
const CONFIDENCE_LOGIC_ONLY: u8 = 55;
const CONFIDENCE_UNEXPLAINED: u8 = 30;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeCategory {
    Dates,
    Progress,
    Duration,
    Constraint,
    Logic,
    Added,
}

impl ChangeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dates => "DATES",
            Self::Progress => "PROGRESS",
            Self::Duration => "DURATION",
            Self::Constraint => "CONSTRAINT",
            Self::Logic => "LOGIC",
            Self::Added => "ADDED",
        }
    }
}

/// One detected attribute change on a chain activity
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvidence {
    pub activity_id: String,
    pub category: ChangeCategory,
    pub field: String,
    pub baseline_value: Option<String>,
    pub current_value: Option<String>,
    pub description: String,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipChangeKind {
    Added,
    Removed,
    Modified,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipChange {
    pub predecessor_id: String,
    pub successor_id: String,
    pub kind: RelationshipChangeKind,
    pub detail: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushExplanation {
    pub activity_id: String,
    pub activity_name: String,
    /// Current minus baseline early start; None for new activities
    pub start_move: Option<f64>,
    /// Current minus baseline early finish; None for new activities
    pub finish_move: Option<f64>,
    pub driving_chain_current: Vec<ChainLink>,
    pub driving_chain_baseline: Vec<ChainLink>,
    pub change_evidence: Vec<ChangeEvidence>,
    pub relationship_changes: Vec<RelationshipChange>,
    /// Most frequent evidence category (first seen wins ties)
    pub primary_category: Option<ChangeCategory>,
    /// Ordinal heuristic, 0-100
    pub confidence: u8,
    pub narrative: String,
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_date)
}

fn evidence(
    activity_id: &str,
    category: ChangeCategory,
    field: &str,
    before: Option<String>,
    after: Option<String>,
) -> ChangeEvidence {
    let description = format!(
        "{activity_id} {field} changed from {} to {}",
        before.as_deref().unwrap_or("none"),
        after.as_deref().unwrap_or("none")
    );
    ChangeEvidence {
        activity_id: activity_id.to_string(),
        category,
        field: field.to_string(),
        baseline_value: before,
        current_value: after,
        description,
    }
}

/// Attribute-level diff of one activity across snapshots
fn diff_activity(base: &Activity, cur: &Activity) -> Vec<ChangeEvidence> {
    let id = cur.id.as_str();
    let mut found = Vec::new();

    let date_fields = [
        ("start", ChangeCategory::Dates, base.start, cur.start),
        ("finish", ChangeCategory::Dates, base.finish, cur.finish),
    ];
    let progress_dates = [
        ("actualStart", ChangeCategory::Progress, base.actual_start, cur.actual_start),
        ("actualFinish", ChangeCategory::Progress, base.actual_finish, cur.actual_finish),
    ];

    for (field, category, before, after) in date_fields {
        if before != after {
            found.push(evidence(id, category, field, date_text(before), date_text(after)));
        }
    }

    if base.status != cur.status {
        found.push(evidence(
            id,
            ChangeCategory::Progress,
            "status",
            Some(base.status.as_str().to_string()),
            Some(cur.status.as_str().to_string()),
        ));
    }
    for (field, category, before, after) in progress_dates {
        if before != after {
            found.push(evidence(id, category, field, date_text(before), date_text(after)));
        }
    }

    if (base.duration_days - cur.duration_days).abs() > MOVE_EPSILON {
        found.push(evidence(
            id,
            ChangeCategory::Duration,
            "durationDays",
            Some(base.duration_days.to_string()),
            Some(cur.duration_days.to_string()),
        ));
    }

    if base.constraint_kind != cur.constraint_kind || base.constraint_date != cur.constraint_date {
        let describe = |a: &Activity| match a.constraint_date {
            Some(d) => format!("{} {}", a.constraint_kind.as_str(), format_date(d)),
            None => a.constraint_kind.as_str().to_string(),
        };
        found.push(evidence(
            id,
            ChangeCategory::Constraint,
            "constraint",
            Some(describe(base)),
            Some(describe(cur)),
        ));
    }

    found
}

fn relation_text(rel: &Relationship) -> String {
    format!("{} lag {}", rel.relation_type.code(), rel.lag)
}

/// Relationship diff restricted to links touching `ids`
fn diff_relationships(
    baseline: &ProjectNetwork,
    current: &ProjectNetwork,
    ids: &HashSet<&str>,
) -> Vec<RelationshipChange> {
    let touches = |r: &&Relationship| {
        ids.contains(r.predecessor_id.as_str()) || ids.contains(r.successor_id.as_str())
    };
    let key = |r: &Relationship| (r.predecessor_id.clone(), r.successor_id.clone());

    let mut base_map: HashMap<(String, String), &Relationship> = HashMap::new();
    for rel in baseline.relationships.iter().filter(touches) {
        base_map.entry(key(rel)).or_insert(rel);
    }

    let mut changes = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for rel in current.relationships.iter().filter(touches) {
        let k = key(rel);
        if !seen.insert(k.clone()) {
            continue;
        }
        match base_map.get(&k) {
            None => changes.push(RelationshipChange {
                predecessor_id: rel.predecessor_id.clone(),
                successor_id: rel.successor_id.clone(),
                kind: RelationshipChangeKind::Added,
                detail: format!("added {} -> {} ({})", k.0, k.1, relation_text(rel)),
            }),
            Some(base) => {
                let modified = base.relation_type != rel.relation_type
                    || (base.lag - rel.lag).abs() > MOVE_EPSILON;
                if modified {
                    changes.push(RelationshipChange {
                        predecessor_id: rel.predecessor_id.clone(),
                        successor_id: rel.successor_id.clone(),
                        kind: RelationshipChangeKind::Modified,
                        detail: format!(
                            "{} -> {} changed from {} to {}",
                            k.0,
                            k.1,
                            relation_text(base),
                            relation_text(rel)
                        ),
                    });
                }
            }
        }
    }

    for rel in baseline.relationships.iter().filter(touches) {
        let k = key(rel);
        if seen.contains(&k) {
            continue;
        }
        seen.insert(k.clone());
        changes.push(RelationshipChange {
            predecessor_id: rel.predecessor_id.clone(),
            successor_id: rel.successor_id.clone(),
            kind: RelationshipChangeKind::Removed,
            detail: format!("removed {} -> {} ({})", k.0, k.1, relation_text(rel)),
        });
    }

    changes
}

/// Category with the highest count; ties go to the first seen
fn primary_category(
    evidence: &[ChangeEvidence],
    relationship_changes: &[RelationshipChange],
) -> Option<(ChangeCategory, usize)> {
    let mut tally: Vec<(ChangeCategory, usize)> = Vec::new();
    let categories = evidence
        .iter()
        .map(|e| e.category)
        .chain(relationship_changes.iter().map(|_| ChangeCategory::Logic));

    for category in categories {
        match tally.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => tally.push((category, 1)),
        }
    }

    tally.into_iter().fold(None, |best, (category, count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((category, count)),
    })
}

fn describe_move(delta: f64) -> String {
    if delta > MOVE_EPSILON {
        format!("slipped {delta:.1} days")
    } else if delta < -MOVE_EPSILON {
        format!("recovered {:.1} days", -delta)
    } else {
        "did not move".to_string()
    }
}

#[allow(clippy::too_many_arguments)]
fn narrative(
    id: &str,
    name: &str,
    start_move: Option<f64>,
    finish_move: Option<f64>,
    chain: &[ChainLink],
    evidence: &[ChangeEvidence],
    relationship_changes: &[RelationshipChange],
    primary: Option<(ChangeCategory, usize)>,
) -> String {
    let mut text = match (finish_move, start_move) {
        (Some(finish), Some(start)) => format!(
            "Activity {id} ({name}) finish {} and start {} against the baseline.",
            describe_move(finish),
            describe_move(start)
        ),
        _ => format!(
            "Activity {id} ({name}) is new in the current schedule and has no baseline dates."
        ),
    };

    if chain.len() > 1 {
        let path: Vec<&str> = chain.iter().map(|l| l.id.as_str()).collect();
        text.push_str(&format!(" Current driving path: {}.", path.join(" <- ")));
    }

    let total = evidence.len() + relationship_changes.len();
    match primary {
        Some((category, count)) => {
            text.push_str(&format!(
                " Primary cause: {} ({count} of {total} findings).",
                category.as_str()
            ));
            let key_items: Vec<&str> = evidence
                .iter()
                .map(|e| e.description.as_str())
                .chain(relationship_changes.iter().map(|r| r.detail.as_str()))
                .take(2)
                .collect();
            text.push_str(&format!(" Key evidence: {}.", key_items.join("; ")));
        }
        None => text.push_str(" No change was found along its driving chain."),
    }

    text
}

/// Explains date movement using a comparator's two CPM results
#[derive(Debug, Clone, Copy)]
pub struct PushExplainer<'c, 'a> {
    comparator: &'c ScheduleComparator<'a>,
}

impl<'c, 'a> PushExplainer<'c, 'a> {
    pub fn new(comparator: &'c ScheduleComparator<'a>) -> Self {
        Self { comparator }
    }

    /// Fails only if `activity_id` is absent from the current snapshot
    pub fn explain(&self, activity_id: &str) -> Result<PushExplanation> {
        let cmp = self.comparator;
        let current = cmp
            .current
            .get(activity_id)
            .ok_or_else(|| ScheduleError::ActivityNotFound(activity_id.to_string()))?;
        let baseline = cmp.baseline.get(activity_id);

        let start_move = baseline.map(|b| current.early_start - b.early_start);
        let finish_move = baseline.map(|b| current.early_finish - b.early_finish);

        let chain_current = cmp.current.driving_chain(activity_id)?;
        let chain_baseline = match baseline {
            Some(_) => cmp.baseline.driving_chain(activity_id)?,
            None => Vec::new(),
        };

        let base_raw = cmp.baseline_network.activity_map();
        let cur_raw = cmp.current_network.activity_map();

        let mut change_evidence = Vec::new();
        for link in &chain_current {
            let Some(cur) = cur_raw.get(link.id.as_str()) else {
                continue;
            };
            match base_raw.get(link.id.as_str()) {
                Some(base) => change_evidence.extend(diff_activity(base, cur)),
                None => change_evidence.push(evidence(
                    &link.id,
                    ChangeCategory::Added,
                    "activity",
                    None,
                    Some(cur.name.clone()),
                )),
            }
        }

        let chain_ids: HashSet<&str> = chain_current.iter().map(|l| l.id.as_str()).collect();
        let relationship_changes =
            diff_relationships(cmp.baseline_network, cmp.current_network, &chain_ids);

        let primary = primary_category(&change_evidence, &relationship_changes);

        let direct_driver = chain_current.get(1).map(|l| l.id.as_str());
        let confidence = if direct_driver
            .map_or(false, |d| change_evidence.iter().any(|e| e.activity_id == d))
        {
            CONFIDENCE_DIRECT
        } else if !change_evidence.is_empty() {
            CONFIDENCE_INDIRECT
        } else if !relationship_changes.is_empty() {
            CONFIDENCE_LOGIC_ONLY
        } else {
            CONFIDENCE_UNEXPLAINED
        };

        let narrative = narrative(
            activity_id,
            &current.name,
            start_move,
            finish_move,
            &chain_current,
            &change_evidence,
            &relationship_changes,
            primary,
        );

        tracing::debug!(
            activity = activity_id,
            evidence = change_evidence.len(),
            relationship_changes = relationship_changes.len(),
            confidence,
            "push explanation built"
        );

        Ok(PushExplanation {
            activity_id: activity_id.to_string(),
            activity_name: current.name.clone(),
            start_move,
            finish_move,
            driving_chain_current: chain_current,
            driving_chain_baseline: chain_baseline,
            change_evidence,
            relationship_changes,
            primary_category: primary.map(|(category, _)| category),
            confidence,
            narrative,
        })
    }
}

impl ScheduleComparator<'_> {
    pub fn explain_push(&self, activity_id: &str) -> Result<PushExplanation> {
        PushExplainer::new(self).explain(activity_id)
    }
}

/// Explain one activity's movement with default settings
pub fn explain_push(
    activity_id: &str,
    baseline: &ProjectNetwork,
    current: &ProjectNetwork,
) -> Result<PushExplanation> {
    ScheduleComparator::new(baseline, current).explain_push(activity_id)
}
