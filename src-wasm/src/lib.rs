//! Schedule Forensics - WASM Engine
//!
//! Exposes a `ScheduleEngine` class to JavaScript wrapping the stateful
//! project container. Networks and reports cross the boundary as plain JS
//! objects with camelCase fields.
//!
//! ## Usage from JavaScript
//!
//! ```javascript
//! import init, { ScheduleEngine } from 'schedule_forensics_wasm';
//!
//! await init();
//! const engine = new ScheduleEngine();
//! engine.loadCurrent({ activities, relationships });
//! const result = engine.calculate();
//! ```

mod utils;

use schedule_forensics::date_utils::parse_date;
use schedule_forensics::{Activity, AnalysisConfig, ProjectNetwork, ProjectState};
use serde::Serialize;
use utils::js_error;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// Log macro for console output
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::log(&format_args!($($t)*).to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error("Failed to serialize result", e))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| js_error(&format!("Failed to deserialize {what}"), e))
}

/// The schedule analysis engine exposed to JavaScript
#[wasm_bindgen]
pub struct ScheduleEngine {
    state: ProjectState,
}

#[wasm_bindgen]
impl ScheduleEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScheduleEngine {
        utils::set_panic_hook();
        console_log!("[WASM] ScheduleEngine created");
        ScheduleEngine {
            state: ProjectState::new(),
        }
    }

    /// Load the current snapshot (`{ activities, relationships }`)
    #[wasm_bindgen(js_name = loadCurrent)]
    pub fn load_current(&mut self, network_val: JsValue) -> Result<(), JsValue> {
        let network: ProjectNetwork = from_js(network_val, "network")?;
        console_log!(
            "[WASM] Current schedule loaded: {} activities, {} relationships",
            network.activities.len(),
            network.relationships.len()
        );
        self.state.load_current(network);
        Ok(())
    }

    #[wasm_bindgen(js_name = loadBaseline)]
    pub fn load_baseline(&mut self, network_val: JsValue) -> Result<(), JsValue> {
        let network: ProjectNetwork = from_js(network_val, "baseline")?;
        console_log!("[WASM] Baseline loaded: {} activities", network.activities.len());
        self.state.load_baseline(network);
        Ok(())
    }

    /// Replace the analysis settings; omitted fields take their defaults
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_val: JsValue) -> Result<(), JsValue> {
        let config: AnalysisConfig = from_js(config_val, "config")?;
        self.state
            .set_config(config)
            .map_err(|e| js_error("Invalid config", e))
    }

    /// Set or clear (with `undefined`/`null`) the data date, as YYYY-MM-DD
    #[wasm_bindgen(js_name = setDataDate)]
    pub fn set_data_date(&mut self, date: Option<String>) -> Result<(), JsValue> {
        let parsed = match date.as_deref() {
            Some(raw) => Some(
                parse_date(raw)
                    .ok_or_else(|| JsValue::from_str(&format!("Invalid data date: {raw}")))?,
            ),
            None => None,
        };
        self.state.set_data_date(parsed);
        Ok(())
    }

    #[wasm_bindgen(js_name = addActivity)]
    pub fn add_activity(&mut self, activity_val: JsValue) -> Result<(), JsValue> {
        let activity: Activity = from_js(activity_val, "activity")?;
        self.state
            .add_activity(activity)
            .map_err(|e| js_error("Add failed", e))
    }

    /// Apply a partial update (`{ durationDays: 5, status: "complete" }`)
    #[wasm_bindgen(js_name = updateActivity)]
    pub fn update_activity(&mut self, id: String, updates_val: JsValue) -> Result<(), JsValue> {
        let updates: serde_json::Value = from_js(updates_val, "updates")?;
        self.state
            .update_activity(&id, updates)
            .map_err(|e| js_error("Update failed", e))
    }

    #[wasm_bindgen(js_name = deleteActivity)]
    pub fn delete_activity(&mut self, id: String) -> Result<(), JsValue> {
        self.state
            .delete_activity(&id)
            .map_err(|e| js_error("Delete failed", e))
    }

    /// Run CPM and return `{ activities, stats }`
    pub fn calculate(&self) -> Result<JsValue, JsValue> {
        let result = self
            .state
            .calculate()
            .map_err(|e| js_error("CPM failed", e))?;
        console_log!(
            "[WASM] CPM complete: {} activities, {} critical, finish day {}",
            result.stats.activity_count,
            result.stats.critical_count,
            result.stats.project_finish
        );
        to_js(&result)
    }

    #[wasm_bindgen(js_name = drivingChain)]
    pub fn driving_chain(&self, id: String) -> Result<JsValue, JsValue> {
        let chain = self
            .state
            .driving_chain(&id)
            .map_err(|e| js_error("Driving chain failed", e))?;
        to_js(&chain)
    }

    /// DCMA assessment; falls back to the host's current date when no data date is set
    #[wasm_bindgen(js_name = runDcma)]
    pub fn run_dcma(&self) -> Result<JsValue, JsValue> {
        let data_date = self
            .state
            .data_date()
            .or_else(utils::host_today)
            .ok_or_else(|| JsValue::from_str("Data date unavailable"))?;
        let report = self
            .state
            .run_dcma_at(data_date)
            .map_err(|e| js_error("DCMA failed", e))?;
        console_log!(
            "[WASM] DCMA complete: score {}, {} failed",
            report.score,
            report.failed
        );
        to_js(&report)
    }

    #[wasm_bindgen(js_name = computeFci)]
    pub fn compute_fci(&self) -> Result<JsValue, JsValue> {
        let report = self
            .state
            .compute_fci()
            .map_err(|e| js_error("FCI failed", e))?;
        to_js(&report)
    }

    pub fn compare(&self) -> Result<JsValue, JsValue> {
        let result = self
            .state
            .compare()
            .map_err(|e| js_error("Compare failed", e))?;
        to_js(&result)
    }

    #[wasm_bindgen(js_name = explainPush)]
    pub fn explain_push(&self, id: String) -> Result<JsValue, JsValue> {
        let explanation = self
            .state
            .explain_push(&id)
            .map_err(|e| js_error("Explain failed", e))?;
        to_js(&explanation)
    }

    #[wasm_bindgen(js_name = activityCount)]
    pub fn activity_count(&self) -> usize {
        self.state.activity_count()
    }

    #[wasm_bindgen(js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    pub fn dispose(&mut self) {
        self.state.clear();
        console_log!("[WASM] Engine disposed");
    }
}

impl Default for ScheduleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Module initialization - called when WASM module is loaded
#[wasm_bindgen(start)]
pub fn main() {
    utils::set_panic_hook();
    console_log!("[WASM] Schedule forensics module loaded");
}
