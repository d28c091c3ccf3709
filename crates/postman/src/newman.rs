//! Newman runner and JSON report summary

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{PostmanError, PostmanResult};

/// One `newman run` invocation
#[derive(Debug, Clone)]
pub struct NewmanRun {
    /// Executable to launch
    pub program: PathBuf,
    pub collection: PathBuf,
    pub environment: PathBuf,
    pub report_dir: PathBuf,
    /// Stamped into the report file name
    pub date: NaiveDate,
}

impl NewmanRun {
    pub fn new(collection: impl Into<PathBuf>, environment: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("newman"),
            collection: collection.into(),
            environment: environment.into(),
            report_dir: PathBuf::from("reports"),
            date: Local::now().date_naive(),
        }
    }

    /// `reports/newman_report_{YYYYmmdd}.json`
    pub fn report_path(&self) -> PathBuf {
        self.report_dir
            .join(format!("newman_report_{}.json", self.date.format("%Y%m%d")))
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "run".to_string(),
            self.collection.display().to_string(),
            "-e".to_string(),
            self.environment.display().to_string(),
            "--reporters".to_string(),
            "cli,json".to_string(),
            "--reporter-json-export".to_string(),
            self.report_path().display().to_string(),
        ]
    }

    /// Run newman to completion and summarise its JSON report.
    pub async fn execute(&self) -> PostmanResult<NewmanOutcome> {
        for (label, path) in [("Collection", &self.collection), ("Environment", &self.environment)] {
            if !path.exists() {
                warn!("{} file not found: {}", label, path.display());
            }
        }
        std::fs::create_dir_all(&self.report_dir)?;

        let mut command = Command::new(&self.program);
        command.args(self.args());
        if let Some(node_path) = global_node_path().await {
            command.env("NODE_PATH", node_path);
        }

        info!("Running {} {}", self.program.display(), self.args().join(" "));
        let status = command.status().await.map_err(|source| PostmanError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        // Killed by a signal
        let code = status.code().unwrap_or(1);

        let report = self.report_path();
        info!("JSON report: {}", report.display());
        let summary = NewmanSummary::from_file(&report)?;

        Ok(NewmanOutcome { code, summary })
    }
}

/// `npm root -g`, so globally installed reporters resolve
async fn global_node_path() -> Option<String> {
    match Command::new("npm").args(["root", "-g"]).output().await {
        Ok(output) if output.status.success() => {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!path.is_empty()).then_some(path)
        }
        Ok(output) => {
            warn!("npm root -g exited with {}", output.status);
            None
        }
        Err(e) => {
            warn!("npm not available, NODE_PATH left unset: {}", e);
            None
        }
    }
}

/// Request and failure counts from a newman JSON report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewmanSummary {
    pub total: u64,
    pub failures: u64,
}

impl NewmanSummary {
    /// Read `run.stats.requests.total` and the length of `run.failures`.
    pub fn from_report(report: &Value) -> Self {
        let run = &report["run"];
        Self {
            total: run["stats"]["requests"]["total"].as_u64().unwrap_or(0),
            failures: run["failures"].as_array().map_or(0, |f| f.len() as u64),
        }
    }

    pub fn from_file(path: &Path) -> PostmanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PostmanError::Report {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let report: Value = serde_json::from_str(&content).map_err(|e| PostmanError::Report {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_report(&report))
    }

    pub fn passed(&self) -> u64 {
        self.total.saturating_sub(self.failures)
    }
}

/// Exit code of newman plus its report summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewmanOutcome {
    pub code: i32,
    pub summary: NewmanSummary,
}

impl NewmanOutcome {
    pub fn success(&self) -> bool {
        self.code == 0 && self.summary.failures == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run() -> NewmanRun {
        NewmanRun {
            date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            ..NewmanRun::new("postman/collection.json", "postman/environment.json")
        }
    }

    #[test]
    fn test_report_path() {
        assert_eq!(run().report_path(), PathBuf::from("reports/newman_report_20250603.json"));
    }

    #[test]
    fn test_args() {
        assert_eq!(
            run().args(),
            vec![
                "run",
                "postman/collection.json",
                "-e",
                "postman/environment.json",
                "--reporters",
                "cli,json",
                "--reporter-json-export",
                "reports/newman_report_20250603.json",
            ]
        );
    }

    #[test]
    fn test_summary_from_report() {
        let report = json!({
            "run": {
                "stats": { "requests": { "total": 12, "failed": 0 } },
                "failures": [{ "error": { "message": "expected 200" } }, { "error": {} }]
            }
        });
        let summary = NewmanSummary::from_report(&report);
        assert_eq!(summary, NewmanSummary { total: 12, failures: 2 });
        assert_eq!(summary.passed(), 10);
    }

    #[test]
    fn test_summary_defaults_to_zero() {
        let summary = NewmanSummary::from_report(&json!({}));
        assert_eq!(summary, NewmanSummary::default());
    }

    #[test]
    fn test_outcome_success() {
        let clean = NewmanSummary { total: 5, failures: 0 };
        assert!(NewmanOutcome { code: 0, summary: clean }.success());
        assert!(!NewmanOutcome { code: 1, summary: clean }.success());
        assert!(!NewmanOutcome {
            code: 0,
            summary: NewmanSummary { total: 5, failures: 1 }
        }
        .success());
    }

    #[test]
    fn test_missing_report() {
        let tmp = tempfile::tempdir().unwrap();
        let err = NewmanSummary::from_file(&tmp.path().join("none.json")).unwrap_err();
        assert!(matches!(err, PostmanError::Report { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_with_stub_newman() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        // Writes the report to the path after --reporter-json-export and fails
        let script = tmp.path().join("newman");
        std::fs::write(
            &script,
            r#"#!/bin/sh
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--reporter-json-export" ]; then out="$2"; fi
  shift
done
echo '{"run":{"stats":{"requests":{"total":3}},"failures":[{}]}}' > "$out"
exit 1
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let newman = NewmanRun {
            program: script,
            report_dir: tmp.path().join("reports"),
            ..run()
        };
        let outcome = newman.execute().await.unwrap();
        assert_eq!(outcome.code, 1);
        assert_eq!(outcome.summary, NewmanSummary { total: 3, failures: 1 });
        assert!(!outcome.success());
        assert!(newman.report_path().exists());
    }

    #[tokio::test]
    async fn test_execute_missing_program() {
        let tmp = tempfile::tempdir().unwrap();
        let newman = NewmanRun {
            program: tmp.path().join("no-such-newman"),
            report_dir: tmp.path().join("reports"),
            ..run()
        };
        assert!(matches!(newman.execute().await, Err(PostmanError::Spawn { .. })));
    }
}
