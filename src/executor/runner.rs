//! Contract verifier
//!
//! Drives the endpoint checks in dependency order and turns every HTTP exchange into
//! exactly one recorded result.

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::checks;
use crate::contract::{self, BodyKind, Endpoint, ExpectedStatus};
use crate::http::{HttpClient, HttpRequest};
use crate::models::{CheckGroup, CheckResult, Prerequisite, RunState, RunSummary};
use crate::utils::Timer;

/// Longest body excerpt embedded in a result's details
const DETAILS_LIMIT: usize = 500;

/// Message and details recorded for a check that passed
#[derive(Clone, Debug, PartialEq)]
pub struct Passed {
    pub message: String,
    pub details: Option<String>,
}

impl Passed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// One request against one contract
#[derive(Clone, Debug)]
pub struct EndpointCheck {
    pub name: String,
    pub endpoint: Endpoint,
    pub request: HttpRequest,
}

impl EndpointCheck {
    pub fn new(name: impl Into<String>, endpoint: Endpoint) -> Self {
        let rules = endpoint.contract();
        Self {
            name: name.into(),
            endpoint,
            request: HttpRequest::new(rules.method, rules.path),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.request = self.request.json(body);
        self
    }
}

/// Result of a check plus the decoded body when the check passed
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub result: CheckResult,
    pub body: Option<Value>,
}

impl CheckOutcome {
    fn failed(result: CheckResult) -> Self {
        Self { result, body: None }
    }

    pub fn passed_body(&self) -> Option<&Value> {
        if self.result.success() {
            self.body.as_ref()
        } else {
            None
        }
    }
}

/// Contract verifier for the tutoring API
pub struct ContractVerifier {
    client: HttpClient,
    critical_keywords: Vec<String>,
}

impl ContractVerifier {
    /// Create a verifier for `base_url` + `api_prefix`
    pub fn new(
        base_url: &str,
        api_prefix: &str,
        timeout_secs: u64,
        critical_keywords: Vec<String>,
    ) -> Result<Self> {
        let client = HttpClient::new(base_url, timeout_secs)?.api_prefix(api_prefix);
        Ok(Self {
            client,
            critical_keywords,
        })
    }

    pub fn api_base(&self) -> String {
        self.client.api_base()
    }

    /// Run every check group with fresh run state
    pub async fn run_all(&self) -> RunSummary {
        let mut state = RunState::new();
        self.run_with_state(&mut state).await
    }

    /// Run every check group in dependency order against the given state
    pub async fn run_with_state(&self, state: &mut RunState) -> RunSummary {
        let started_at = Utc::now();
        info!("Starting contract verification against {}", self.api_base());
        info!("Test user email: {}", state.test_user_email());

        let mut results = Vec::new();

        for group in CheckGroup::all() {
            info!("=== {} ===", group);
            for result in checks::run_group(group, self, state).await {
                info!("  {}", result);
                results.push(result);
            }
        }

        let summary = RunSummary::new(
            self.api_base(),
            state.test_user_email(),
            started_at,
            results,
            &self.critical_keywords,
        );

        info!(
            "Verification completed in {}ms - Pass: {}/{} ({:.1}%), critical failures: {}",
            summary.duration_ms(),
            summary.passed,
            summary.total,
            summary.success_rate,
            summary.critical_failures
        );

        summary
    }

    /// Perform one check: send, classify status, validate shape, then inspect.
    ///
    /// Never returns an error; every failure mode becomes a failed result.
    pub async fn check_endpoint<F>(&self, check: EndpointCheck, inspect: F) -> CheckOutcome
    where
        F: FnOnce(&Value) -> Result<Passed, String>,
    {
        let rules = check.endpoint.contract();
        let timer = Timer::start(&check.name);
        debug!("Checking {} ({})", check.name, check.endpoint);

        let response = match self.client.send(&check.request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} - request failed: {}", check.name, e);
                let result = CheckResult::fail(&check.name, format!("Request failed: {e}"))
                    .with_duration(timer.stop());
                return CheckOutcome::failed(result);
            }
        };

        if !rules.expected.matches(response.status_code) {
            let message = match rules.expected {
                ExpectedStatus::Success => {
                    format!("HTTP {}: {}", response.status_code, response.body)
                }
                ExpectedStatus::Exactly(code) => format!(
                    "Expected {}, got {}: {}",
                    code, response.status_code, response.body
                ),
            };
            let result = CheckResult::fail(&check.name, message).with_duration(timer.stop());
            return CheckOutcome::failed(result);
        }

        let body = match response.json() {
            Ok(body) => body,
            Err(_) if rules.body == BodyKind::Any => Value::String(response.body.clone()),
            Err(e) => {
                let result = CheckResult::fail(&check.name, format!("Invalid JSON body: {e}"))
                    .with_details(excerpt(&response.body))
                    .with_duration(timer.stop());
                return CheckOutcome::failed(result);
            }
        };

        if let Err(violation) = contract::validate(rules, &body) {
            let result = CheckResult::fail(&check.name, violation.to_string())
                .with_details(excerpt(&body.to_string()))
                .with_duration(timer.stop());
            return CheckOutcome::failed(result);
        }

        match inspect(&body) {
            Ok(passed) => {
                let mut result = CheckResult::pass(&check.name, passed.message);
                if let Some(details) = passed.details {
                    result = result.with_details(details);
                }
                CheckOutcome {
                    result: result.with_duration(timer.stop()),
                    body: Some(body),
                }
            }
            Err(message) => {
                let result = CheckResult::fail(&check.name, message)
                    .with_details(excerpt(&body.to_string()))
                    .with_duration(timer.stop());
                CheckOutcome::failed(result)
            }
        }
    }

    /// Failed result for a check whose prerequisite is missing; no request is made
    pub fn short_circuit(
        &self,
        name: &str,
        state: &RunState,
        required: &[Prerequisite],
    ) -> Option<CheckResult> {
        state.first_missing(required).map(|missing| {
            warn!("{} - skipping request: {}", name, missing.missing_message());
            CheckResult::fail(
                name,
                format!("Cannot run check - {}", missing.missing_message()),
            )
        })
    }
}

/// Truncate a body for embedding in details
pub fn excerpt(text: &str) -> String {
    if text.chars().count() <= DETAILS_LIMIT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(DETAILS_LIMIT).collect();
        format!("{cut}...")
    }
}
