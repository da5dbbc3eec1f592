//! Final report for a finished upload.

use crate::upload::error::{UploadError, UploadResult};
use crate::upload::uploader::UploadReport;

/// What the command prints when the flow ends, and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub exit_code: i32,
}

impl Completion {
    /// Render the result of an upload. `json` appends the report to stdout.
    pub fn from_result(result: &UploadResult<UploadReport>, json: bool) -> Self {
        match result {
            Ok(report) => {
                let mut stdout = vec!["Transaction successful.".to_string()];
                if json {
                    match serde_json::to_string_pretty(report) {
                        Ok(text) => stdout.push(text),
                        Err(e) => tracing::warn!(error = %e, "Failed to serialize report"),
                    }
                }
                Self {
                    stdout,
                    stderr: Vec::new(),
                    exit_code: 0,
                }
            }
            Err(e) => {
                let mut stderr = Vec::new();
                if matches!(e, UploadError::ApplicationFailure { .. }) {
                    stderr.push("Transaction failed.".to_string());
                }
                stderr.push(e.to_string());
                Self {
                    stdout: Vec::new(),
                    stderr,
                    exit_code: e.exit_code(),
                }
            }
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Write the collected lines to the process streams.
    pub fn emit(&self) {
        for line in &self.stdout {
            println!("{}", line);
        }
        for line in &self.stderr {
            eprintln!("{}", line);
        }
    }
}
