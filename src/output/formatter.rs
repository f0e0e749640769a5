//! Output formatters for verification runs
//!
//! Provides the console report plus JSON, CSV, and one-line summary formats.

use anyhow::{Context, Result};
use std::io::Write;

use crate::models::{CheckResult, RunSummary};

const RULE_WIDTH: usize = 60;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Format a single check result, with its details line when present
    pub fn format_result(&self, result: &CheckResult) -> String {
        let status = if result.success() {
            self.paint("✅ PASS", "32")
        } else {
            self.paint("❌ FAIL", "31")
        };
        let mut line = format!("{}: {} - {}", status, result.name(), result.message());
        if let Some(details) = result.details() {
            line.push_str(&format!("\n   Details: {details}"));
        }
        line
    }

    /// Format a whole run
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let output = match self.format {
            OutputFormat::Table => self.format_report(summary),
            OutputFormat::Json => serde_json::to_string(summary)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary)?,
            OutputFormat::Csv => format_csv(&summary.results)?,
            OutputFormat::Summary => self.format_brief(summary),
        };
        Ok(output)
    }

    fn format_report(&self, summary: &RunSummary) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut output = String::new();

        output.push_str("🚀 API Contract Verification\n");
        output.push_str(&format!("📍 Base URL: {}\n", summary.base_url));
        output.push_str(&format!("👤 Test User Email: {}\n", summary.test_user_email));
        output.push_str(&rule);
        output.push('\n');

        for result in &summary.results {
            output.push_str(&self.format_result(result));
            output.push('\n');
        }

        output.push('\n');
        output.push_str(&rule);
        output.push_str("\n📊 TEST SUMMARY\n");
        output.push_str(&rule);
        output.push('\n');

        output.push_str(&format!("Total Tests: {}\n", summary.total));
        output.push_str(&format!("✅ Passed: {}\n", self.paint(&summary.passed.to_string(), "32")));
        let failed = summary.failed.to_string();
        let failed = if summary.failed > 0 {
            self.paint(&failed, "31")
        } else {
            failed
        };
        output.push_str(&format!("❌ Failed: {failed}\n"));
        output.push_str(&format!("Success Rate: {:.1}%\n", summary.success_rate));
        output.push_str(&format!("Duration: {}ms\n", summary.duration_ms()));

        if summary.failed > 0 {
            output.push_str("\n🔍 FAILED TESTS:\n");
            for result in summary.failures() {
                output.push_str(&format!("  ❌ {}: {}\n", result.name(), result.message()));
            }
        }

        output.push_str("\n🎯 CRITICAL ISSUES:\n");
        if summary.has_critical_failures() {
            for result in summary.critical() {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    self.paint("🚨", "31"),
                    result.name(),
                    result.message()
                ));
            }
        } else {
            output.push_str("  ✅ No critical failures detected\n");
        }

        output
    }

    fn format_brief(&self, summary: &RunSummary) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%), {} critical failure(s) in {}ms",
            summary.base_url,
            summary.passed,
            summary.total,
            summary.success_rate,
            summary.critical_failures,
            summary.duration_ms()
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Results as CSV rows, one per check
pub fn format_csv(results: &[CheckResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "success", "message", "details", "duration_ms", "timestamp"])?;
    for result in results {
        let duration = result.duration_ms().to_string();
        let timestamp = result.timestamp().to_rfc3339();
        writer.write_record([
            result.name(),
            if result.success() { "true" } else { "false" },
            result.message(),
            result.details().unwrap_or(""),
            duration.as_str(),
            timestamp.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Write a run report to a file, without colors
pub fn write_results_to_file(path: &str, summary: &RunSummary, format: OutputFormat) -> Result<()> {
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary)?;

    let mut file =
        std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
