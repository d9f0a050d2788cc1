//! Sequential scenario runner.
//!
//! Each scenario gets a fresh [`ScenarioContext`]; its steps run in order and
//! the first failing step ends the scenario.

use crate::config::EngineConfig;
use crate::error::AssayError;
use crate::feature::{Feature, Scenario};
use crate::http::HttpClient;
use crate::scenario::ScenarioContext;
use crate::steps::StepRouter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The step that ended a scenario.
#[derive(Debug)]
pub struct StepFailure {
    pub line: usize,
    pub step: String,
    pub error: AssayError,
}

#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub steps_passed: usize,
    pub failure: Option<StepFailure>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug)]
pub struct FeatureReport {
    pub name: String,
    pub scenarios: Vec<ScenarioReport>,
}

impl FeatureReport {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }
}

pub struct Runner {
    router: StepRouter,
    config: Arc<EngineConfig>,
    client: Arc<dyn HttpClient>,
}

impl Runner {
    pub fn new(config: Arc<EngineConfig>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            router: StepRouter::standard(),
            config,
            client,
        }
    }

    pub fn run_feature(&self, feature: &Feature) -> FeatureReport {
        let scenarios = feature
            .scenarios
            .iter()
            .map(|scenario| self.run_scenario(feature, scenario))
            .collect();
        FeatureReport {
            name: feature.name.clone(),
            scenarios,
        }
    }

    pub fn run_scenario(&self, feature: &Feature, scenario: &Scenario) -> ScenarioReport {
        info!(feature = %feature.name, scenario = %scenario.name, "Starting scenario");
        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            steps_passed: 0,
            failure: None,
        };

        let mut ctx = match ScenarioContext::new(Arc::clone(&self.config), Arc::clone(&self.client))
        {
            Ok(ctx) => ctx,
            Err(error) => {
                report.failure = Some(StepFailure {
                    line: scenario.line,
                    step: format!("Scenario: {}", scenario.name),
                    error,
                });
                return report;
            }
        };

        for step in feature.steps_of(scenario) {
            debug!(line = step.line, step = %step.text, "Running step");
            if let Err(error) = self.router.dispatch_step(&mut ctx, step) {
                warn!(line = step.line, step = %step.text, "Step failed: {}", error);
                report.failure = Some(StepFailure {
                    line: step.line,
                    step: format!("{} {}", step.keyword, step.text),
                    error,
                });
                break;
            }
            report.steps_passed += 1;
        }

        info!(
            scenario = %scenario.name,
            passed = report.passed(),
            steps = report.steps_passed,
            "Finished scenario"
        );
        report
    }
}
