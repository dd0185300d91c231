//! Engine State Container
//!
//! Holds the current and baseline project networks between calls, so a host
//! (the wasm wrapper, a service, a test harness) can load data once and run
//! analyses repeatedly.

use crate::compare::{ComparisonResult, ScheduleComparator};
use crate::config::AnalysisConfig;
use crate::cpm::CpmEngine;
use crate::date_utils::parse_date;
use crate::dcma::{DcmaReport, ScheduleQualityAnalyzer};
use crate::error::{Result, ScheduleError};
use crate::explain::PushExplanation;
use crate::fci::{FciReport, FloatCredibilityScorer};
use crate::types::{
    Activity, ActivityStatus, ChainLink, ConstraintKind, CpmResult, MilestoneKind, ProjectNetwork,
};
use chrono::NaiveDate;

/// Project state container
#[derive(Debug, Default)]
pub struct ProjectState {
    current: Option<ProjectNetwork>,
    baseline: Option<ProjectNetwork>,
    config: AnalysisConfig,
}

/// Patch value for an optional field: `Some(None)` clears it on JSON null,
/// `None` means the value did not decode and the field is left alone
fn nullable<T>(
    value: &serde_json::Value,
    decode: impl FnOnce(&serde_json::Value) -> Option<T>,
) -> Option<Option<T>> {
    if value.is_null() {
        Some(None)
    } else {
        decode(value).map(Some)
    }
}

fn patch_date(value: &serde_json::Value) -> Option<Option<NaiveDate>> {
    nullable(value, |v| v.as_str().and_then(parse_date))
}

fn patch_string(value: &serde_json::Value) -> Option<Option<String>> {
    nullable(value, |v| v.as_str().map(|s| s.to_string()))
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn data_date(&self) -> Option<NaiveDate> {
        self.config.data_date
    }

    pub fn set_data_date(&mut self, data_date: Option<NaiveDate>) {
        self.config.data_date = data_date;
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn load_current(&mut self, network: ProjectNetwork) {
        tracing::debug!(
            activities = network.activities.len(),
            relationships = network.relationships.len(),
            "current schedule loaded"
        );
        self.current = Some(network);
    }

    pub fn load_baseline(&mut self, network: ProjectNetwork) {
        tracing::debug!(
            activities = network.activities.len(),
            relationships = network.relationships.len(),
            "baseline schedule loaded"
        );
        self.baseline = Some(network);
    }

    pub fn load_current_json(&mut self, json: &str) -> Result<()> {
        let network: ProjectNetwork = serde_json::from_str(json)?;
        self.load_current(network);
        Ok(())
    }

    pub fn load_baseline_json(&mut self, json: &str) -> Result<()> {
        let network: ProjectNetwork = serde_json::from_str(json)?;
        self.load_baseline(network);
        Ok(())
    }

    pub fn current(&self) -> Result<&ProjectNetwork> {
        self.current.as_ref().ok_or(ScheduleError::NotInitialized)
    }

    pub fn baseline(&self) -> Result<&ProjectNetwork> {
        self.baseline.as_ref().ok_or(ScheduleError::BaselineNotLoaded)
    }

    fn current_mut(&mut self) -> Result<&mut ProjectNetwork> {
        self.current.as_mut().ok_or(ScheduleError::NotInitialized)
    }

    /// Add an activity to the current network
    /// An activity with the same id is replaced in place
    pub fn add_activity(&mut self, activity: Activity) -> Result<()> {
        let network = self.current_mut()?;
        match network.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => network.activities.push(activity),
        }
        Ok(())
    }

    /// Apply a camelCase JSON patch to one activity
    /// Unknown fields and values that do not decode are ignored. JSON null
    /// clears an optional field and resets the constraint kind.
    pub fn update_activity(&mut self, id: &str, updates: serde_json::Value) -> Result<()> {
        let network = self.current_mut()?;
        let activity = network
            .activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ScheduleError::ActivityNotFound(id.to_string()))?;

        let Some(obj) = updates.as_object() else {
            return Ok(());
        };

        for (key, value) in obj {
            match key.as_str() {
                "name" => {
                    if let Some(v) = value.as_str() {
                        activity.name = v.to_string();
                    }
                }
                "durationDays" | "duration" => {
                    if let Some(v) = value.as_f64() {
                        activity.duration_days = v;
                    }
                }
                "status" => {
                    if let Some(v) = value.as_str() {
                        activity.status = ActivityStatus::parse(v);
                    }
                }
                "start" => {
                    if let Some(v) = patch_date(value) {
                        activity.start = v;
                    }
                }
                "finish" => {
                    if let Some(v) = patch_date(value) {
                        activity.finish = v;
                    }
                }
                "actualStart" => {
                    if let Some(v) = patch_date(value) {
                        activity.actual_start = v;
                    }
                }
                "actualFinish" => {
                    if let Some(v) = patch_date(value) {
                        activity.actual_finish = v;
                    }
                }
                "constraintKind" | "constraintType" => {
                    if let Some(kind) = nullable(value, |v| v.as_str().map(ConstraintKind::parse)) {
                        activity.constraint_kind = kind.unwrap_or_default();
                    }
                }
                "constraintDate" => {
                    if let Some(v) = patch_date(value) {
                        activity.constraint_date = v;
                    }
                }
                "calendarId" => {
                    if let Some(v) = patch_string(value) {
                        activity.calendar_id = v;
                    }
                }
                "wbsId" => {
                    if let Some(v) = patch_string(value) {
                        activity.wbs_id = v;
                    }
                }
                "milestone" => {
                    let decoded = nullable(value, |v| {
                        serde_json::from_value::<MilestoneKind>(v.clone()).ok()
                    });
                    if let Some(kind) = decoded {
                        activity.milestone = kind;
                    }
                }
                _ => {
                    tracing::trace!(field = key.as_str(), "ignoring unknown activity field");
                }
            }
        }
        Ok(())
    }

    /// Remove an activity and every relationship touching it
    pub fn delete_activity(&mut self, id: &str) -> Result<()> {
        let network = self.current_mut()?;
        let before = network.activities.len();
        network.activities.retain(|a| a.id != id);
        if network.activities.len() == before {
            return Err(ScheduleError::ActivityNotFound(id.to_string()));
        }
        network
            .relationships
            .retain(|r| r.predecessor_id != id && r.successor_id != id);
        Ok(())
    }

    pub fn activity_count(&self) -> usize {
        self.current.as_ref().map_or(0, |n| n.activities.len())
    }

    pub fn calculate(&self) -> Result<CpmResult> {
        CpmEngine::with_config(self.config.clone()).run(self.current()?)
    }

    pub fn driving_chain(&self, id: &str) -> Result<Vec<ChainLink>> {
        self.calculate()?.driving_chain(id)
    }

    /// DCMA assessment at the configured data date
    pub fn run_dcma(&self) -> Result<DcmaReport> {
        let data_date = self.config.data_date.ok_or(ScheduleError::DataDateRequired)?;
        self.run_dcma_at(data_date)
    }

    pub fn run_dcma_at(&self, data_date: NaiveDate) -> Result<DcmaReport> {
        ScheduleQualityAnalyzer::with_config(self.config.clone())
            .analyze(self.current()?, data_date)
    }

    pub fn compute_fci(&self) -> Result<FciReport> {
        FloatCredibilityScorer::with_config(self.config.clone()).score(self.current()?)
    }

    fn comparator(&self) -> Result<ScheduleComparator<'_>> {
        let current = self.current()?;
        let baseline = self.baseline()?;
        ScheduleComparator::with_config(baseline, current, self.config.clone())
    }

    pub fn compare(&self) -> Result<ComparisonResult> {
        Ok(self.comparator()?.compare())
    }

    pub fn explain_push(&self, id: &str) -> Result<PushExplanation> {
        self.comparator()?.explain_push(id)
    }

    /// Drop both networks; configuration is kept
    pub fn clear(&mut self) {
        self.current = None;
        self.baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Relationship;
    use serde_json::json;

    fn network() -> ProjectNetwork {
        ProjectNetwork::new(
            vec![
                Activity::new("A", "Design", 5.0),
                Activity::new("B", "Build", 10.0),
                Activity::new("C", "Test", 3.0),
            ],
            vec![Relationship::fs("A", "B"), Relationship::fs("B", "C")],
        )
    }

    #[test]
    fn test_not_initialized() {
        let state = ProjectState::new();
        assert!(matches!(state.calculate(), Err(ScheduleError::NotInitialized)));
        assert!(matches!(state.compute_fci(), Err(ScheduleError::NotInitialized)));
        assert_eq!(state.activity_count(), 0);
    }

    #[test]
    fn test_baseline_required_for_compare() {
        let mut state = ProjectState::new();
        state.load_current(network());
        assert!(matches!(state.compare(), Err(ScheduleError::BaselineNotLoaded)));
        assert!(matches!(state.explain_push("C"), Err(ScheduleError::BaselineNotLoaded)));

        state.load_baseline(network());
        let result = state.compare().unwrap();
        assert!(result.movements.is_empty());
    }

    #[test]
    fn test_dcma_requires_data_date() {
        let mut state = ProjectState::new();
        state.load_current(network());
        assert!(matches!(state.run_dcma(), Err(ScheduleError::DataDateRequired)));

        state.set_data_date(parse_date("2024-06-01"));
        let report = state.run_dcma().unwrap();
        assert_eq!(report.checks.len(), 14);
    }

    #[test]
    fn test_update_activity() {
        let mut state = ProjectState::new();
        state.load_current(network());

        state
            .update_activity(
                "B",
                json!({
                    "durationDays": 12,
                    "status": "In Progress",
                    "actualStart": "2024-01-08",
                    "constraintType": "SNET",
                    "unknownField": true
                }),
            )
            .unwrap();

        let b = state.current().unwrap().activity("B").unwrap();
        assert_eq!(b.duration_days, 12.0);
        assert_eq!(b.status, ActivityStatus::InProgress);
        assert_eq!(b.actual_start, parse_date("2024-01-08"));
        assert_eq!(b.constraint_kind, ConstraintKind::StartNoEarlierThan);

        let cpm = state.calculate().unwrap();
        assert_eq!(cpm.project_finish(), 20.0);

        let err = state.update_activity("Z", json!({"name": "x"})).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_activity_keeps_fields_on_bad_values() {
        let mut state = ProjectState::new();
        state.load_current(network());
        state
            .update_activity(
                "B",
                json!({
                    "start": "2024-01-08",
                    "constraintKind": "MSO",
                    "constraintDate": "2024-01-08",
                    "wbsId": "1.2",
                    "milestone": "finish"
                }),
            )
            .unwrap();

        state
            .update_activity(
                "B",
                json!({
                    "start": "not a date",
                    "constraintKind": 7,
                    "constraintDate": false,
                    "wbsId": 12,
                    "milestone": "halfway"
                }),
            )
            .unwrap();
        let b = state.current().unwrap().activity("B").unwrap();
        assert_eq!(b.start, parse_date("2024-01-08"));
        assert_eq!(b.constraint_kind, ConstraintKind::MustStartOn);
        assert_eq!(b.constraint_date, parse_date("2024-01-08"));
        assert_eq!(b.wbs_id.as_deref(), Some("1.2"));
        assert_eq!(b.milestone, Some(MilestoneKind::Finish));

        state
            .update_activity(
                "B",
                json!({
                    "start": null,
                    "constraintKind": null,
                    "constraintDate": null,
                    "wbsId": null,
                    "milestone": null
                }),
            )
            .unwrap();
        let b = state.current().unwrap().activity("B").unwrap();
        assert_eq!(b.start, None);
        assert_eq!(b.constraint_kind, ConstraintKind::None);
        assert_eq!(b.constraint_date, None);
        assert_eq!(b.wbs_id, None);
        assert_eq!(b.milestone, None);
    }

    #[test]
    fn test_add_and_delete_activity() {
        let mut state = ProjectState::new();
        assert!(matches!(
            state.add_activity(Activity::new("X", "X", 1.0)),
            Err(ScheduleError::NotInitialized)
        ));

        state.load_current(network());
        state.add_activity(Activity::new("D", "Handover", 2.0)).unwrap();
        state.add_activity(Activity::new("A", "Design v2", 6.0)).unwrap();
        assert_eq!(state.activity_count(), 4);
        assert_eq!(state.current().unwrap().activities[0].name, "Design v2");

        state.delete_activity("B").unwrap();
        let current = state.current().unwrap();
        assert_eq!(current.activities.len(), 3);
        assert!(current.relationships.is_empty());
        assert!(state.delete_activity("B").unwrap_err().is_not_found());
    }

    #[test]
    fn test_load_json_and_driving_chain() {
        let mut state = ProjectState::new();
        state
            .load_current_json(
                r#"{
                    "activities": [
                        {"id": "A", "name": "First", "durationDays": 2},
                        {"id": "B", "name": "Second", "durationDays": 3}
                    ],
                    "relationships": [
                        {"predecessorId": "A", "successorId": "B", "type": "FS", "lag": 1}
                    ]
                }"#,
            )
            .unwrap();

        let chain = state.driving_chain("B").unwrap();
        let ids: Vec<&str> = chain.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);

        assert!(matches!(
            state.load_baseline_json("not json"),
            Err(ScheduleError::Json(_))
        ));
        assert!(!state.has_baseline());
    }

    #[test]
    fn test_reject_cycles_config() {
        let mut state = ProjectState::new();
        let mut net = network();
        net.relationships.push(Relationship::fs("C", "A"));
        state.load_current(net);
        assert!(state.calculate().is_ok());

        let config = AnalysisConfig {
            reject_cycles: true,
            ..AnalysisConfig::default()
        };
        state.set_config(config).unwrap();
        assert!(matches!(
            state.calculate(),
            Err(ScheduleError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_clear_keeps_config() {
        let mut state = ProjectState::new();
        state.set_data_date(parse_date("2024-01-01"));
        state.load_current(network());
        state.load_baseline(network());
        state.clear();
        assert!(!state.is_initialized());
        assert!(!state.has_baseline());
        assert!(state.data_date().is_some());
    }
}
