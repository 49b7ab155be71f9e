use crate::{DataIntegrityError, Report, ScenarioError};
#[cfg(feature = "rt")]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
#[cfg(feature = "rt")]
use serde_with::{serde_as, DurationSecondsWithFrac};
use std::fmt;
use std::time::Duration;

/// Result of the verify phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "status", rename_all = "snake_case"))]
pub enum Integrity {
    /// The scenario does not read data back.
    #[default]
    NotChecked,
    Verified {
        objects: usize,
    },
    Mismatch {
        errors: Vec<DataIntegrityError>,
    },
}

impl Integrity {
    pub fn from_errors(objects: usize, errors: Vec<DataIntegrityError>) -> Self {
        if errors.is_empty() {
            Integrity::Verified { objects }
        } else {
            Integrity::Mismatch { errors }
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Integrity::Mismatch { .. })
    }
}

/// Result of the teardown phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "rt", serde(tag = "status", rename_all = "snake_case"))]
pub enum Cleanup {
    #[default]
    Clean,
    Failed {
        errors: Vec<ScenarioError>,
    },
}

impl Cleanup {
    pub fn from_errors(errors: Vec<ScenarioError>) -> Self {
        if errors.is_empty() {
            Cleanup::Clean
        } else {
            Cleanup::Failed { errors }
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Cleanup::Clean)
    }
}

/// Everything a single scenario run produced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "rt", cfg_eval::cfg_eval, serde_as)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct ScenarioResult {
    pub name: String,
    pub reports: Vec<Report>,
    pub integrity: Integrity,
    pub cleanup: Cleanup,
    /// Set when the scenario ended early (setup failure or an aborted phase).
    pub fatal: Option<ScenarioError>,
    /// Tolerated per-operation failures (missing resources, transient backend errors).
    pub failures: Vec<ScenarioError>,
    #[cfg_attr(feature = "rt", serde_as(as = "DurationSecondsWithFrac<f64>"))]
    pub elapsed: Duration,
}

impl ScenarioResult {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reports: vec![],
            integrity: Integrity::default(),
            cleanup: Cleanup::default(),
            fatal: None,
            failures: vec![],
            elapsed: Duration::ZERO,
        }
    }

    pub fn report(&self, operation: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.operation() == operation)
    }

    /// Completed without a fatal error, integrity mismatch or leftover resources.
    pub fn is_success(&self) -> bool {
        self.fatal.is_none() && self.integrity.is_ok() && self.cleanup.is_clean()
    }
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== {} =====", self.name.to_uppercase())?;
        writeln!(
            f,
            "Elapsed: {}",
            humantime::format_duration(Duration::from_millis(self.elapsed.as_millis() as u64))
        )?;

        if let Some(fatal) = &self.fatal {
            writeln!(f, "ERROR: {fatal}")?;
        }

        for report in &self.reports {
            writeln!(f)?;
            writeln!(f, "{report}")?;
        }

        match &self.integrity {
            Integrity::NotChecked => {}
            Integrity::Verified { objects } => {
                writeln!(f, "\nData integrity verified for {objects} object(s)")?;
            }
            Integrity::Mismatch { errors } => {
                writeln!(f, "\nData integrity FAILED:")?;
                for err in errors {
                    writeln!(f, "  {err}")?;
                }
            }
        }

        if !self.failures.is_empty() {
            writeln!(f, "\n{} operation(s) failed:", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  {failure}")?;
            }
        }

        if let Cleanup::Failed { errors } = &self.cleanup {
            writeln!(f, "\nWARNING: cleanup incomplete:")?;
            for err in errors {
                writeln!(f, "  {err}")?;
            }
        }

        Ok(())
    }
}

/// Ordered results of every scenario a suite ran against one backend.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "rt", derive(Serialize, Deserialize))]
pub struct SuiteReport {
    pub backend: String,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            results: vec![],
        }
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(ScenarioResult::is_success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Backend: {}", self.backend)?;
        for result in &self.results {
            writeln!(f)?;
            write!(f, "{result}")?;
        }

        let failed: Vec<&str> = self.failed().map(|r| r.name.as_str()).collect();
        if !failed.is_empty() {
            writeln!(f, "\nScenarios with errors: {}", failed.join(", "))?;
        }
        Ok(())
    }
}
