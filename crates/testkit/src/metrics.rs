//! Standardized metrics collection and reporting for CI.
//!
//! Statistical worldtests export a `metrics.json` so that drifts in map
//! generation (terrain relief, feature density, repair effort) show up as
//! diffs between runs rather than as flaky assertions.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/benchmark identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Git commit hash (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Overall test result
    pub result: TestResult,

    /// Height generation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Feature placement metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureMetrics>,

    /// Connectivity repair metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<ConnectivityMetrics>,

    /// Test execution metrics
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed all validations
    Pass,
    /// Test failed
    Fail,
    /// Test was skipped
    Skip,
}

/// Map generation throughput and shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Maps generated
    pub maps_generated: usize,

    /// Grid cells generated across all maps
    pub cells_generated: usize,

    /// Average generation time per map (microseconds)
    pub avg_gen_time_us: f64,

    /// Min generation time (microseconds)
    pub min_gen_time_us: u128,

    /// Max generation time (microseconds)
    pub max_gen_time_us: u128,

    /// Maps generated per archetype name
    pub by_archetype: BTreeMap<String, usize>,

    /// Average `max - min` height per map, in steps
    pub avg_relief: f64,
}

/// Feature placement outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureMetrics {
    /// Feature slots requested
    pub slots_requested: usize,

    /// Features placed
    pub features_placed: usize,

    /// `features_placed / slots_requested`, 0 when nothing was requested
    pub placement_rate: f64,

    /// Average requested slots per tile of average axis
    pub avg_requested_per_axis: f64,

    /// Most attempts any single slot used
    pub max_attempts_per_slot: u32,

    /// Placements undone because grounding split the walkable area
    pub split_rejections: usize,

    /// Placed features per kind name
    pub by_kind: BTreeMap<String, usize>,
}

/// Connectivity repair effort
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectivityMetrics {
    /// Maps that needed any repair
    pub maps_repaired: usize,

    /// Cells moved across all maps
    pub cells_adjusted: usize,

    /// Largest number of dry regions seen before repair
    pub max_initial_components: usize,
}

/// Test execution and infrastructure metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Total test duration (seconds)
    pub duration_seconds: f64,

    /// Number of assertions checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                commit_hash: None,
                result: TestResult::Pass,
                terrain: None,
                features: None,
                connectivity: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set commit hash
    pub fn commit_hash(mut self, hash: impl Into<String>) -> Self {
        self.report.commit_hash = Some(hash.into());
        self
    }

    /// Set terrain metrics
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set feature metrics
    pub fn features(mut self, metrics: FeatureMetrics) -> Self {
        self.report.features = Some(metrics);
        self
    }

    /// Set connectivity metrics
    pub fn connectivity(mut self, metrics: ConnectivityMetrics) -> Self {
        self.report.connectivity = Some(metrics);
        self
    }

    /// Set test execution metrics
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
