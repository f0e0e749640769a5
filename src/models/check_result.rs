//! Check result models for API contract verification
//!
//! Defines check groups, individual results, and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Check groups in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckGroup {
    Tutor,
    Authentication,
    DatabaseConnection,
    ChatSessions,
    VocabularySrs,
    Additional,
}

impl CheckGroup {
    /// Get group number (1-6)
    pub fn number(&self) -> u8 {
        match self {
            CheckGroup::Tutor => 1,
            CheckGroup::Authentication => 2,
            CheckGroup::DatabaseConnection => 3,
            CheckGroup::ChatSessions => 4,
            CheckGroup::VocabularySrs => 5,
            CheckGroup::Additional => 6,
        }
    }

    /// Get group name, used as the prefix of every check name in the group
    pub fn name(&self) -> &'static str {
        match self {
            CheckGroup::Tutor => "AI Tutor",
            CheckGroup::Authentication => "Authentication",
            CheckGroup::DatabaseConnection => "Database Connection",
            CheckGroup::ChatSessions => "Chat Sessions",
            CheckGroup::VocabularySrs => "Vocabulary SRS",
            CheckGroup::Additional => "Additional",
        }
    }

    /// Identifiers this group needs from earlier groups
    pub fn prerequisites(&self) -> &'static str {
        match self {
            CheckGroup::Tutor | CheckGroup::Authentication => "none",
            CheckGroup::DatabaseConnection => "user id",
            CheckGroup::ChatSessions => "user id, session id",
            CheckGroup::VocabularySrs => "user id, due card",
            CheckGroup::Additional => "user id (pronunciation only)",
        }
    }

    /// Get all groups in execution order
    pub fn all() -> Vec<CheckGroup> {
        vec![
            CheckGroup::Tutor,
            CheckGroup::Authentication,
            CheckGroup::DatabaseConnection,
            CheckGroup::ChatSessions,
            CheckGroup::VocabularySrs,
            CheckGroup::Additional,
        ]
    }

    /// Build a check name within this group, e.g. "Authentication - Login"
    pub fn check_name(&self, check: &str) -> String {
        format!("{} - {}", self.name(), check)
    }
}

impl fmt::Display for CheckGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {}: {}", self.number(), self.name())
    }
}

/// Outcome of a single endpoint check.
///
/// Fields are private: once a result is built it is only read, never changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    name: String,
    success: bool,
    message: String,
    details: Option<String>,
    duration_ms: u64,
    timestamp: DateTime<Utc>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, true, message)
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, false, message)
    }

    fn new(name: impl Into<String>, success: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success,
            message: message.into(),
            details: None,
            duration_ms: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this failure belongs to a critical area.
    ///
    /// Plain case-insensitive substring match of the check name against the keywords.
    pub fn is_critical(&self, keywords: &[String]) -> bool {
        if self.success {
            return false;
        }
        let name = self.name.to_lowercase();
        keywords
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "✅ PASS" } else { "❌ FAIL" };
        write!(f, "{}: {} - {}", status, self.name, self.message)
    }
}

/// Aggregate outcome of one verifier run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub base_url: String,
    pub test_user_email: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub critical_failures: usize,
    pub critical_keywords: Vec<String>,
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn new(
        base_url: impl Into<String>,
        test_user_email: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<CheckResult>,
        critical_keywords: &[String],
    ) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.success()).count();
        let failed = total - passed;
        let success_rate = if total == 0 {
            0.0
        } else {
            (passed as f64 / total as f64) * 100.0
        };
        let critical_failures = results
            .iter()
            .filter(|r| r.is_critical(critical_keywords))
            .count();

        Self {
            base_url: base_url.into(),
            test_user_email: test_user_email.into(),
            started_at,
            finished_at: Utc::now(),
            total,
            passed,
            failed,
            success_rate,
            critical_failures,
            critical_keywords: critical_keywords.to_vec(),
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.success())
    }

    pub fn critical(&self) -> impl Iterator<Item = &CheckResult> {
        self.results
            .iter()
            .filter(|r| r.is_critical(&self.critical_keywords))
    }

    pub fn has_critical_failures(&self) -> bool {
        self.critical_failures > 0
    }

    /// Process exit code: 0 only when no critical check failed
    pub fn exit_code(&self) -> i32 {
        if self.has_critical_failures() {
            1
        } else {
            0
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
