//! HTTP probing domain: endpoint scenarios and load-probe statistics

pub mod scenario;
pub mod timing;

pub use scenario::{EndpointReport, ScenarioResult, TestScenario};
pub use timing::{PerformanceSummary, RequestTiming};
