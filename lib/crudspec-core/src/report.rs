//! Writes [`ScenarioResult`]s to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::client::HarnessError;
use crate::scenario::{Outcome, ScenarioResult};

/// Serialization format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML, behind the `yaml` feature.
    #[cfg(feature = "yaml")]
    Yaml,
}

impl ReportFormat {
    /// Picks the format from a file extension: YAML for `yml`/`yaml` when the `yaml`
    /// feature is enabled, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        #[cfg(feature = "yaml")]
        {
            let ext = path.extension().unwrap_or_default();
            if ext == "yml" || ext == "yaml" {
                return Self::Yaml;
            }
        }
        #[cfg(not(feature = "yaml"))]
        let _ = path;
        Self::Json
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yml",
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, HarnessError> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
            #[cfg(feature = "yaml")]
            Self::Yaml => {
                use crate::yaml::ToYaml;
                value
                    .to_yaml()
                    .map_err(|err| HarnessError::SerializationError {
                        message: format!("{err:#?}"),
                    })
            }
        }
    }
}

/// Summary of a suite run, written by [`ReportWriter::write_suite`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport<'r> {
    /// Number of scenarios that passed.
    pub passed: usize,
    /// Number of scenarios that failed.
    pub failed: usize,
    /// Every scenario result, in run order.
    pub scenarios: &'r [ScenarioResult],
}

impl<'r> SuiteReport<'r> {
    /// Counts passed and failed scenarios.
    pub fn new(scenarios: &'r [ScenarioResult]) -> Self {
        let passed = scenarios
            .iter()
            .filter(|it| it.outcome == Outcome::Passed)
            .count();
        Self {
            passed,
            failed: scenarios.len() - passed,
            scenarios,
        }
    }
}

/// Writes one file per scenario in a directory.
///
/// File names are the slugified scenario names, e.g. `create-a-product.json`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    /// Writes JSON reports into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: ReportFormat::default(),
        }
    }

    /// Overrides the format; the extension follows it.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Directory the reports are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the report file of the scenario `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let file_name = format!("{}.{}", slug::slugify(name), self.format.extension());
        self.dir.join(file_name)
    }

    /// Writes `result`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Fails on I/O or serialization errors.
    pub fn write(&self, result: &ScenarioResult) -> Result<PathBuf, HarnessError> {
        let path = self.path_for(&result.name);
        write_file(&path, &self.format.render(result)?)?;
        info!(path = %path.display(), outcome = %result.outcome, "scenario report written");
        Ok(path)
    }

    /// Writes every result of a suite into a single file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Fails on I/O or serialization errors.
    pub fn write_suite(
        path: impl AsRef<Path>,
        results: &[ScenarioResult],
    ) -> Result<(), HarnessError> {
        let path = path.as_ref();
        let report = SuiteReport::new(results);
        let contents = ReportFormat::from_path(path).render(&report)?;
        write_file(path, &contents)?;
        info!(path = %path.display(), passed = report.passed, failed = report.failed, "suite report written");
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Scenario, ScenarioRunner};

    async fn passing(name: &str) -> ScenarioResult {
        let scenario = Scenario::new(name).when("nothing happens", |_: &mut ()| {
            Box::pin(async { Ok(()) })
        });
        ScenarioRunner.run(scenario, &mut ()).await
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crudspec-{name}-{}", uuid::Uuid::new_v4()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_path_for_slugifies_name() {
        let writer = ReportWriter::new("target/reports");

        let path = writer.path_for("CT-03: Criar produto válido");

        assert_eq!(path, Path::new("target/reports/ct-03-criar-produto-valido.json"));
    }

    #[tokio::test]
    async fn test_write_scenario_report() {
        let dir = scratch_dir("scenario");
        let writer = ReportWriter::new(&dir);
        let result = passing("List products").await;

        let path = writer.write(&result).expect("written");

        let contents = fs::read_to_string(&path).expect("readable");
        let json: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(json["name"], "List products");
        assert_eq!(json["outcome"], "PASSED");
        assert_eq!(json["steps"][0]["label"], "When nothing happens");
        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_write_suite_report() {
        let dir = scratch_dir("suite");
        let path = dir.join("suite.json");
        let results = vec![passing("first").await, passing("second").await];

        ReportWriter::write_suite(&path, &results).expect("written");

        let contents = fs::read_to_string(&path).expect("readable");
        let json: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(json["passed"], 2);
        assert_eq!(json["failed"], 0);
        assert_eq!(json["scenarios"].as_array().map(Vec::len), Some(2));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ReportFormat::from_path(Path::new("out.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("out")), ReportFormat::Json);
        #[cfg(feature = "yaml")]
        assert_eq!(ReportFormat::from_path(Path::new("out.yaml")), ReportFormat::Yaml);
    }
}
