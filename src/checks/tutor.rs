//! AI Tutor checks
//!
//! Group 1: one tutor request per CEFR level case

use serde_json::{json, Value};
use tracing::info;

use super::{preview, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult};

/// One learner utterance sent to the tutor
#[derive(Clone, Debug)]
pub struct TutorCase {
    pub name: String,
    pub user_text: String,
    pub level: String,
}

impl TutorCase {
    pub fn new(
        name: impl Into<String>,
        user_text: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            user_text: user_text.into(),
            level: level.into(),
        }
    }
}

/// Tutor reply check
#[derive(Clone, Debug)]
pub struct TutorCheck {
    pub cases: Vec<TutorCase>,
}

impl Default for TutorCheck {
    fn default() -> Self {
        Self::new()
            .add_case(TutorCase::new(
                "Basic Grammar Correction",
                "I go to school yesterday",
                "A2",
            ))
            .add_case(TutorCase::new(
                "B1 Level Conversation",
                "I am learning English because I want to travel",
                "B1",
            ))
            .add_case(TutorCase::new(
                "C1 Advanced Level",
                "The economic implications of globalization are quite complex",
                "C1",
            ))
    }
}

impl TutorCheck {
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    pub fn add_case(mut self, case: TutorCase) -> Self {
        self.cases.push(case);
        self
    }

    pub async fn run(&self, verifier: &ContractVerifier) -> Vec<CheckResult> {
        info!("Running AI Tutor checks ({} cases)", self.cases.len());
        let mut results = Vec::with_capacity(self.cases.len());

        for case in &self.cases {
            let check = EndpointCheck::new(CheckGroup::Tutor.check_name(&case.name), Endpoint::Tutor)
                .json(json!({
                    "userText": case.user_text,
                    "userLevel": case.level,
                }));

            let outcome = verifier
                .check_endpoint(check, |body| {
                    let reply = value_text(body.get("reply").unwrap_or(&Value::Null));
                    Ok(Passed::new(format!(
                        "Response received with proper structure for level {}",
                        case.level
                    ))
                    .details(format!("Reply: {}", preview(&reply, 50))))
                })
                .await;

            results.push(outcome.result);
        }

        results
    }
}
