//! Type definitions for the schedule forensics engine
//!
//! Field names serialize as camelCase to match the JavaScript host.
//! Input records are parsed leniently: unknown enum strings fall back to a
//! neutral value and malformed dates become `None`, so a single bad field
//! never rejects a whole network.

use crate::date_utils::opt_date;
use crate::network::NetworkGraph;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lowercase and strip separators so "Finish-to-Start", "PR_FS" and
/// "finish_to_start" compare equal
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Precedence relation type
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    #[default]
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl RelationType {
    /// Two-letter code: "FS", "SS", "FF", "SF"
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Parse a relation type string
    /// Unrecognized strings are treated as Finish-to-Start
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "ss" | "prss" | "starttostart" => Self::StartToStart,
            "ff" | "prff" | "finishtofinish" => Self::FinishToFinish,
            "sf" | "prsf" | "starttofinish" => Self::StartToFinish,
            _ => Self::FinishToStart,
        }
    }
}

impl From<String> for RelationType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<RelationType> for String {
    fn from(rel: RelationType) -> Self {
        rel.code().to_string()
    }
}

/// Activity progress status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ActivityStatus {
    NotStarted,
    InProgress,
    Complete,
    #[default]
    Unknown,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "notstarted" | "tknotstart" | "planned" => Self::NotStarted,
            "inprogress" | "tkactive" | "active" | "started" => Self::InProgress,
            "complete" | "completed" | "tkcomplete" | "done" => Self::Complete,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for ActivityStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ActivityStatus> for String {
    fn from(status: ActivityStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Date constraint placed on an activity
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ConstraintKind {
    #[default]
    None,
    // Hard
    MustStartOn,
    MustFinishOn,
    MandatoryStart,
    MandatoryFinish,
    StartNoLaterThan,
    FinishNoLaterThan,
    // Soft
    StartNoEarlierThan,
    FinishNoEarlierThan,
    AsLateAsPossible,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MustStartOn => "must-start-on",
            Self::MustFinishOn => "must-finish-on",
            Self::MandatoryStart => "mandatory-start",
            Self::MandatoryFinish => "mandatory-finish",
            Self::StartNoEarlierThan => "start-no-earlier-than",
            Self::StartNoLaterThan => "start-no-later-than",
            Self::FinishNoEarlierThan => "finish-no-earlier-than",
            Self::FinishNoLaterThan => "finish-no-later-than",
            Self::AsLateAsPossible => "as-late-as-possible",
        }
    }

    /// Accepts kebab-case names, short codes ("mfo", "snet") and P6 codes ("CS_MEO")
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "muststarton" | "mso" | "csmso" => Self::MustStartOn,
            "mustfinishon" | "mfo" | "csmeo" | "csmfo" => Self::MustFinishOn,
            "mandatorystart" | "csmandstart" => Self::MandatoryStart,
            "mandatoryfinish" | "csmandfin" => Self::MandatoryFinish,
            "startnoearlierthan" | "snet" | "csmsoa" => Self::StartNoEarlierThan,
            "startnolaterthan" | "snlt" | "csmsob" => Self::StartNoLaterThan,
            "finishnoearlierthan" | "fnet" | "csmeoa" => Self::FinishNoEarlierThan,
            "finishnolaterthan" | "fnlt" | "csmeob" => Self::FinishNoLaterThan,
            "aslateaspossible" | "alap" | "csalap" => Self::AsLateAsPossible,
            _ => Self::None,
        }
    }

    /// Hard constraints stop logic from driving the date: the "on" kinds
    /// and the "no later than" deadlines
    pub fn is_hard(self) -> bool {
        matches!(
            self,
            Self::MustStartOn
                | Self::MustFinishOn
                | Self::MandatoryStart
                | Self::MandatoryFinish
                | Self::StartNoLaterThan
                | Self::FinishNoLaterThan
        )
    }

    pub fn is_soft(self) -> bool {
        matches!(
            self,
            Self::StartNoEarlierThan | Self::FinishNoEarlierThan | Self::AsLateAsPossible
        )
    }
}

impl From<String> for ConstraintKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ConstraintKind> for String {
    fn from(kind: ConstraintKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Explicit milestone designation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    Start,
    Finish,
}

/// Activity record supplied by the external parser
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Durable activity code; cross-snapshot comparison matches on this key
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Duration in days (0 = milestone)
    #[serde(default)]
    pub duration_days: f64,

    #[serde(default)]
    pub status: ActivityStatus,

    // === Snapshot dates ===
    #[serde(default, with = "opt_date")]
    pub start: Option<NaiveDate>,
    #[serde(default, with = "opt_date")]
    pub finish: Option<NaiveDate>,
    #[serde(default, with = "opt_date")]
    pub actual_start: Option<NaiveDate>,
    #[serde(default, with = "opt_date")]
    pub actual_finish: Option<NaiveDate>,

    // === Constraints ===
    #[serde(default)]
    pub constraint_kind: ConstraintKind,
    #[serde(default, with = "opt_date")]
    pub constraint_date: Option<NaiveDate>,

    // === Grouping keys (opaque) ===
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub wbs_id: Option<String>,

    /// Explicit start/finish milestone flag. When absent, zero-duration
    /// open-start / open-finish activities are treated as milestones.
    #[serde(default)]
    pub milestone: Option<MilestoneKind>,
}

impl Activity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_days: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_days,
            ..Self::default()
        }
    }

    pub fn is_milestone(&self) -> bool {
        self.duration_days == 0.0
    }

    pub fn is_complete(&self) -> bool {
        self.status == ActivityStatus::Complete
    }

    /// Start milestone, given whether the activity has any valid predecessor
    pub fn is_start_milestone(&self, has_predecessors: bool) -> bool {
        match self.milestone {
            Some(kind) => kind == MilestoneKind::Start,
            None => self.is_milestone() && !has_predecessors,
        }
    }

    /// Finish milestone, given whether the activity has any valid successor
    pub fn is_finish_milestone(&self, has_successors: bool) -> bool {
        match self.milestone {
            Some(kind) => kind == MilestoneKind::Finish,
            None => self.is_milestone() && !has_successors,
        }
    }
}

/// Precedence relationship between two activities
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub predecessor_id: String,
    pub successor_id: String,

    #[serde(rename = "type", default)]
    pub relation_type: RelationType,

    /// Lag in days (negative = lead)
    #[serde(default)]
    pub lag: f64,
}

impl Relationship {
    pub fn new(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        relation_type: RelationType,
        lag: f64,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            relation_type,
            lag,
        }
    }

    /// Finish-to-Start with zero lag
    pub fn fs(predecessor_id: impl Into<String>, successor_id: impl Into<String>) -> Self {
        Self::new(predecessor_id, successor_id, RelationType::FinishToStart, 0.0)
    }
}

/// Parsed project network: the engine's only input
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNetwork {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl ProjectNetwork {
    pub fn new(activities: Vec<Activity>, relationships: Vec<Relationship>) -> Self {
        Self {
            activities,
            relationships,
        }
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Index activities by id for repeated lookups
    /// Duplicate ids resolve to their first occurrence
    pub fn activity_map(&self) -> HashMap<&str, &Activity> {
        let mut map = HashMap::with_capacity(self.activities.len());
        for activity in &self.activities {
            map.entry(activity.id.as_str()).or_insert(activity);
        }
        map
    }
}

/// Per-activity CPM output
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledActivity {
    pub id: String,
    pub name: String,
    pub duration_days: f64,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    pub free_float: f64,
    pub is_critical: bool,
    pub driving_predecessor_id: Option<String>,
    pub driving_relation_type: Option<RelationType>,
}

/// One step of a driving-predecessor chain
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChainLink {
    pub id: String,
    pub name: String,
    pub early_start: f64,
    pub early_finish: f64,
    pub late_start: f64,
    pub late_finish: f64,
    pub total_float: f64,
    /// Relation connecting this activity to the previous link (None for the queried activity)
    pub relation_type: Option<RelationType>,
}

/// CPM calculation statistics
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpmStats {
    pub activity_count: usize,
    pub critical_count: usize,
    pub relationship_count: usize,
    pub dropped_relationships: usize,
    pub project_finish: f64,
    /// Activities that could not be topologically ordered
    pub cyclic_activity_ids: Vec<String>,
}

/// CPM calculation result
#[derive(Serialize, Clone, Debug)]
pub struct CpmResult {
    pub activities: Vec<ScheduledActivity>,
    pub stats: CpmStats,
    #[serde(skip)]
    pub(crate) index: HashMap<String, usize>,
    #[serde(skip)]
    pub(crate) graph: NetworkGraph,
    #[serde(skip)]
    pub(crate) max_chain_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_type_parsing() {
        assert_eq!(RelationType::parse("SS"), RelationType::StartToStart);
        assert_eq!(RelationType::parse("PR_FF"), RelationType::FinishToFinish);
        assert_eq!(RelationType::parse("Start-to-Finish"), RelationType::StartToFinish);
        assert_eq!(RelationType::parse("fs"), RelationType::FinishToStart);
        assert_eq!(RelationType::parse("bogus"), RelationType::FinishToStart);
        assert_eq!(RelationType::parse(""), RelationType::FinishToStart);
    }

    #[test]
    fn constraint_classification() {
        assert!(ConstraintKind::parse("mfo").is_hard());
        assert!(ConstraintKind::parse("CS_MSO").is_hard());
        assert!(ConstraintKind::parse("must-finish-on").is_hard());
        assert!(ConstraintKind::parse("snet").is_soft());
        assert!(ConstraintKind::parse("fnet").is_soft());
        assert!(ConstraintKind::parse("snlt").is_hard());
        assert!(ConstraintKind::parse("CS_MEOB").is_hard());
        assert!(!ConstraintKind::parse("finish-no-later-than").is_soft());
        let none = ConstraintKind::parse("asap");
        assert!(!none.is_hard() && !none.is_soft());
    }

    #[test]
    fn status_parsing() {
        assert_eq!(ActivityStatus::parse("TK_Complete"), ActivityStatus::Complete);
        assert_eq!(ActivityStatus::parse("in-progress"), ActivityStatus::InProgress);
        assert_eq!(ActivityStatus::parse("not_started"), ActivityStatus::NotStarted);
        assert_eq!(ActivityStatus::parse("?"), ActivityStatus::Unknown);
    }

    #[test]
    fn milestone_inference() {
        let ms = Activity::new("M0", "Start", 0.0);
        assert!(ms.is_start_milestone(false));
        assert!(!ms.is_start_milestone(true));
        assert!(ms.is_finish_milestone(false));

        let mut explicit = Activity::new("M1", "Finish", 0.0);
        explicit.milestone = Some(MilestoneKind::Finish);
        assert!(!explicit.is_start_milestone(false));
        assert!(explicit.is_finish_milestone(true));

        let task = Activity::new("T", "Work", 3.0);
        assert!(!task.is_start_milestone(false));
    }

    #[test]
    fn network_deserializes_from_camel_case_json() {
        let json = r#"{
            "activities": [
                {"id": "A", "name": "Design", "durationDays": 5, "status": "TK_Active",
                 "start": "2024-01-01 08:00", "constraintKind": "CS_MEO", "calendarId": "5d"},
                {"id": "B", "durationDays": 3, "finish": ""}
            ],
            "relationships": [
                {"predecessorId": "A", "successorId": "B", "type": "PR_SS", "lag": -1.5},
                {"predecessorId": "A", "successorId": "B", "type": "weird"}
            ]
        }"#;
        let net: ProjectNetwork = serde_json::from_str(json).unwrap();
        let a = net.activity("A").unwrap();
        assert_eq!(a.status, ActivityStatus::InProgress);
        assert_eq!(a.constraint_kind, ConstraintKind::MustFinishOn);
        assert_eq!(a.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(a.calendar_id.as_deref(), Some("5d"));
        assert_eq!(net.activity("B").unwrap().finish, None);
        assert_eq!(net.relationships[0].relation_type, RelationType::StartToStart);
        assert_eq!(net.relationships[0].lag, -1.5);
        assert_eq!(net.relationships[1].relation_type, RelationType::FinishToStart);
        assert_eq!(net.relationships[1].lag, 0.0);
    }

    #[test]
    fn relation_type_serializes_as_code() {
        let rel = Relationship::new("A", "B", RelationType::FinishToFinish, 2.0);
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "FF");
        assert_eq!(json["predecessorId"], "A");
    }
}
