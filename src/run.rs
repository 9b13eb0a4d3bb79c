//! One evaluation run over a model directory.
//!
//! Loads the model, checks multiplicities, evaluates every communication
//! need, then writes the results log, the JSON report, the DOT rendering and
//! the model with updated `satisfied` flags next to the input.

use std::path::{Path, PathBuf};

use crate::config::EvalConfig;
use crate::error::{ConfigError, InteropResult, OutputError};
use crate::evaluator::{EvaluationReport, evaluate_all};
use crate::export::ReportExport;
use crate::graph::EntityGraph;
use crate::model::{self, LoadStats};
use crate::render::{render_dot, render_text};

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub graph: EntityGraph,
    pub load: LoadStats,
    pub report: EvaluationReport,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// The model directory must exist and be a directory.
pub fn check_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        return Err(ConfigError::MissingDir {
            path: dir.display().to_string(),
        });
    }
    if !dir.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: dir.display().to_string(),
        });
    }
    Ok(())
}

/// Evaluate the model in `dir` and write all outputs there.
pub fn run(dir: &Path, config: &EvalConfig) -> InteropResult<RunSummary> {
    check_dir(dir)?;
    config.validate()?;

    let model_path = EvalConfig::resolve(dir, &config.model_file);
    let (mut graph, load) = model::load_model(&model_path)?;

    let report = evaluate_all(&mut graph, &config.to_settings());

    let model_name = Path::new(&config.model_file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.model_file.clone());

    let mut written = Vec::new();

    let results_path = EvalConfig::resolve(dir, &config.results_file);
    write_output(&results_path, &render_text(&graph, &report))?;
    written.push(results_path);

    let report_path = EvalConfig::resolve(dir, &config.report_file);
    let json = ReportExport::build(&graph, &model_name, &report).to_json()?;
    write_output(&report_path, &json)?;
    written.push(report_path);

    if config.write_dot {
        let dot_path = EvalConfig::resolve(dir, &config.dot_file);
        write_output(&dot_path, &render_dot(&graph, &report))?;
        written.push(dot_path);
    }

    if config.save_model {
        let saved_path = EvalConfig::resolve(dir, &config.saved_model_file);
        model::save_model(&graph, &model_name, &saved_path)?;
        written.push(saved_path);
    }

    tracing::info!(
        dir = %dir.display(),
        files = written.len(),
        satisfied = report.stats.needs_satisfied,
        needs = report.needs.len(),
        "run complete"
    );

    Ok(RunSummary {
        graph,
        load,
        report,
        written,
    })
}

fn write_output(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|e| OutputError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            check_dir(&missing),
            Err(ConfigError::MissingDir { .. })
        ));
    }

    #[test]
    fn file_is_not_a_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("scadamodel.json");
        std::fs::write(&file, "{}").unwrap();
        assert!(matches!(
            check_dir(&file),
            Err(ConfigError::NotADirectory { .. })
        ));
    }

    #[test]
    fn missing_model_is_a_model_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = run(tmp.path(), &EvalConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::InteropError::Model(crate::error::ModelError::Read { .. })
        ));
    }

    #[test]
    fn empty_model_writes_outputs() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("scadamodel.json"), r#"{"name": "empty"}"#).unwrap();

        let summary = run(tmp.path(), &EvalConfig::default()).unwrap();
        assert_eq!(summary.written.len(), 4);
        for path in &summary.written {
            assert!(path.is_file(), "{}", path.display());
        }
        assert!(summary.report.needs.is_empty());
    }
}
