//! Scenario collection for batch exit-scenario evaluation
//!
//! Scenarios are flat, independently-keyed records evaluated by the same
//! pure functions with different inputs — bear/base/bull variants and
//! user-defined alternatives are data, not types. Since the engine holds no
//! shared state, "calculate all" fans out across threads without locking.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exit::{self, ExitScenarioInputs, ExitScenarioResult, ExitWarning};

/// Lifecycle of a scenario record.
///
/// `draft → calculating → {computed | error}`, and back to `draft` whenever
/// the inputs are edited. `Error` is only entered via an error returned by
/// the engine; the collection never panics on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Draft,
    Calculating,
    Computed,
    Error(String),
}

/// One stored scenario: inputs plus the latest evaluation, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub inputs: ExitScenarioInputs,
    pub result: Option<ExitScenarioResult>,
    #[serde(default)]
    pub warnings: Vec<ExitWarning>,
    pub status: ScenarioStatus,
}

impl ScenarioRecord {
    fn new(name: String, inputs: ExitScenarioInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            inputs,
            result: None,
            warnings: Vec::new(),
            status: ScenarioStatus::Draft,
        }
    }

    /// Evaluate this record's inputs and store the outcome.
    fn calculate(&mut self) {
        self.status = ScenarioStatus::Calculating;
        match exit::evaluate(&self.inputs) {
            Ok(result) => {
                self.warnings = exit::warnings(&result);
                self.result = Some(result);
                self.status = ScenarioStatus::Computed;
            }
            Err(err) => {
                log::warn!("scenario '{}' failed to calculate: {err}", self.name);
                self.result = None;
                self.warnings = Vec::new();
                self.status = ScenarioStatus::Error(err.to_string());
            }
        }
    }
}

/// Flat keyed collection of scenarios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    scenarios: Vec<ScenarioRecord>,
}

impl ScenarioSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scenario in `Draft` state; returns its id.
    pub fn add(&mut self, name: impl Into<String>, inputs: ExitScenarioInputs) -> Uuid {
        let record = ScenarioRecord::new(name.into(), inputs);
        let id = record.id;
        self.scenarios.push(record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&ScenarioRecord> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Replace a scenario's inputs, dropping any stale result and moving the
    /// record back to `Draft`.
    pub fn update_inputs(&mut self, id: Uuid, inputs: ExitScenarioInputs) -> bool {
        match self.scenarios.iter_mut().find(|s| s.id == id) {
            Some(record) => {
                record.inputs = inputs;
                record.result = None;
                record.warnings = Vec::new();
                record.status = ScenarioStatus::Draft;
                true
            }
            None => false,
        }
    }

    /// Copy a scenario under a new id. The copy starts fresh as a `Draft`
    /// without the original's result.
    pub fn duplicate(&mut self, id: Uuid) -> Option<Uuid> {
        let original = self.get(id)?;
        let name = format!("{} (copy)", original.name);
        let inputs = original.inputs.clone();
        Some(self.add(name, inputs))
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.scenarios.len();
        self.scenarios.retain(|s| s.id != id);
        self.scenarios.len() != before
    }

    /// Calculate one scenario; the outcome (including any engine error) is
    /// recorded on the scenario itself.
    pub fn calculate(&mut self, id: Uuid) -> Option<&ScenarioRecord> {
        let record = self.scenarios.iter_mut().find(|s| s.id == id)?;
        record.calculate();
        Some(record)
    }

    /// Calculate every scenario that has no current result, in parallel.
    pub fn calculate_all(&mut self) {
        self.scenarios
            .par_iter_mut()
            .filter(|s| !matches!(s.status, ScenarioStatus::Computed))
            .for_each(|record| record.calculate());
    }

    /// The computed scenario with the highest IRR, if any scenario both
    /// computed and converged.
    pub fn best_by_irr(&self) -> Option<&ScenarioRecord> {
        self.scenarios
            .iter()
            .filter(|s| s.status == ScenarioStatus::Computed)
            .filter_map(|s| {
                s.result
                    .as_ref()
                    .and_then(|r| r.irr_pct)
                    .map(|irr| (s, irr))
            })
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(s, _)| s)
    }
}
