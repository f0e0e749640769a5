//! Additional endpoint checks
//!
//! Group 6: lessons listing (independent) and pronunciation analysis.

use serde_json::json;
use tracing::info;

use super::{sample, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult, Prerequisite, RunState};

pub(super) const GET_LESSONS: &str = "Get Lessons";
pub(super) const PRONUNCIATION: &str = "Pronunciation Analysis";
pub(super) const PRONUNCIATION_REQUIRES: &[Prerequisite] = &[Prerequisite::UserId];

/// Lessons and pronunciation checks
#[derive(Clone, Debug)]
pub struct AdditionalCheck {
    pub lesson_level: String,
    pub phrase: String,
    pub audio_base64: String,
}

impl Default for AdditionalCheck {
    fn default() -> Self {
        Self {
            lesson_level: "B1".to_string(),
            phrase: "Hello, how are you today?".to_string(),
            audio_base64: "mock_audio_data".to_string(),
        }
    }
}

impl AdditionalCheck {
    pub async fn run(&self, verifier: &ContractVerifier, state: &RunState) -> Vec<CheckResult> {
        info!("Running Additional endpoint checks");
        vec![
            self.lessons(verifier).await,
            self.pronunciation(verifier, state).await,
        ]
    }

    async fn lessons(&self, verifier: &ContractVerifier) -> CheckResult {
        let check = EndpointCheck::new(
            CheckGroup::Additional.check_name(GET_LESSONS),
            Endpoint::Lessons,
        )
        .query("level", &self.lesson_level);

        verifier
            .check_endpoint(check, |body| {
                let count = body.as_array().map(Vec::len).unwrap_or_default();
                Ok(Passed::new(format!(
                    "Retrieved {count} lessons for {} level",
                    self.lesson_level
                ))
                .details(format!("Sample lessons: {}", sample(body, "title", 2))))
            })
            .await
            .result
    }

    async fn pronunciation(&self, verifier: &ContractVerifier, state: &RunState) -> CheckResult {
        let name = CheckGroup::Additional.check_name(PRONUNCIATION);
        if let Some(skipped) = verifier.short_circuit(&name, state, PRONUNCIATION_REQUIRES) {
            return skipped;
        }

        let check = EndpointCheck::new(name, Endpoint::Pronunciation).json(json!({
            "userId": state.user_id(),
            "phrase": self.phrase,
            "audioBase64": self.audio_base64,
        }));

        verifier
            .check_endpoint(check, |body| {
                let tips = body["tips"].as_array().map(Vec::len).unwrap_or_default();
                Ok(Passed::new(format!(
                    "Pronunciation analysis completed with score: {}",
                    value_text(&body["score"])
                ))
                .details(format!(
                    "Phrase: '{}', Tips: {tips} provided",
                    value_text(&body["phrase"])
                )))
            })
            .await
            .result
    }
}
