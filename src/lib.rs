//! Schedule forensics engine
//!
//! Critical Path Method scheduling over activity networks, DCMA 14-point
//! schedule quality assessment, float credibility scoring, and two-snapshot
//! comparison with push explanations.

pub mod compare;
pub mod config;
pub mod cpm;
pub mod date_utils;
pub mod dcma;
pub mod engine_state;
pub mod error;
pub mod explain;
pub mod fci;
pub mod network;
pub mod types;

pub use compare::{compare, ActivityMovement, ComparisonResult, ScheduleComparator};
pub use config::AnalysisConfig;
pub use cpm::{calculate, CpmEngine};
pub use dcma::{
    run_dcma, CheckStatus, ComplianceBand, DcmaCheck, DcmaReport, ScheduleQualityAnalyzer,
};
pub use engine_state::ProjectState;
pub use error::{Result, ScheduleError};
pub use explain::{
    explain_push, ChangeCategory, ChangeEvidence, PushExplainer, PushExplanation,
    RelationshipChange, RelationshipChangeKind,
};
pub use fci::{compute_fci, FciGrade, FciReport, FciResult, FloatCredibilityScorer};
pub use network::NetworkGraph;
pub use types::{
    Activity, ActivityStatus, ChainLink, ConstraintKind, CpmResult, CpmStats, MilestoneKind,
    ProjectNetwork, RelationType, Relationship, ScheduledActivity,
};
