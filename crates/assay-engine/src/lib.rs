//! Gherkin-driven HTTP API test engine.
//!
//! Scenarios are written as plain-language steps. Each scenario owns a
//! registry of aliasable components (requests, responses, credentials,
//! configuration properties); step arguments may reference them through
//! `{{Type.alias.path}}` expressions, and assertions evaluate typed
//! predicates against captured responses.
//!
//! # Example
//!
//! ```no_run
//! use assay_engine::{EngineConfig, Feature, ReqwestClient, Runner};
//! use std::sync::Arc;
//!
//! let config = EngineConfig::from_file("assay.yaml").unwrap();
//! let client = ReqwestClient::new(config.timeout()).unwrap();
//! let runner = Runner::new(Arc::new(config), Arc::new(client));
//!
//! let feature = Feature::from_file("features/users.feature").unwrap();
//! let report = runner.run_feature(&feature);
//! if report.failed() > 0 {
//!     eprintln!("{} scenario(s) failed", report.failed());
//! }
//! ```

// ===== Core engine =====
pub mod component;
pub mod error;
pub mod expression;
pub mod extract;
pub mod http;
pub mod predicate;
pub mod registry;
pub mod value;

// ===== Scenario execution =====
pub mod config;
pub mod feature;
pub mod files;
pub mod runner;
pub mod scenario;
pub mod steps;

pub use config::EngineConfig;
pub use error::{AssayError, Result};
pub use feature::{Feature, FeatureError};
pub use http::{HttpClient, ReqwestClient};
pub use registry::ComponentRegistry;
pub use runner::{FeatureReport, Runner, ScenarioReport};
pub use scenario::ScenarioContext;
pub use steps::StepRouter;
pub use value::Value;
