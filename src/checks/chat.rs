//! Chat session checks
//!
//! Group 4: create a session for the test user, then read its history.

use serde_json::json;
use tracing::{debug, info};

use super::{id_string, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult, Prerequisite, RunState};

pub(super) const CREATE_SESSION: &str = "Create Session";
pub(super) const GET_HISTORY: &str = "Get History";
pub(super) const CREATE_REQUIRES: &[Prerequisite] = &[Prerequisite::UserId];
pub(super) const HISTORY_REQUIRES: &[Prerequisite] =
    &[Prerequisite::UserId, Prerequisite::SessionId];

/// Chat session lifecycle check
#[derive(Clone, Debug)]
pub struct ChatCheck {
    pub level: String,
    pub topic: String,
    pub history_limit: u32,
}

impl Default for ChatCheck {
    fn default() -> Self {
        Self {
            level: "B1".to_string(),
            topic: "daily_conversation".to_string(),
            history_limit: 10,
        }
    }
}

impl ChatCheck {
    pub async fn run(&self, verifier: &ContractVerifier, state: &mut RunState) -> Vec<CheckResult> {
        info!("Running Chat Sessions checks");
        vec![
            self.create_session(verifier, state).await,
            self.history(verifier, state).await,
        ]
    }

    async fn create_session(&self, verifier: &ContractVerifier, state: &mut RunState) -> CheckResult {
        let name = CheckGroup::ChatSessions.check_name(CREATE_SESSION);
        if let Some(skipped) = verifier.short_circuit(&name, state, CREATE_REQUIRES) {
            return skipped;
        }
        let user_id = state.user_id().unwrap_or_default().to_string();

        let check = EndpointCheck::new(name, Endpoint::CreateSession).json(json!({
            "userId": user_id,
            "level": self.level,
            "topic": self.topic,
        }));

        let outcome = verifier
            .check_endpoint(check, |body| {
                let id = id_string(&body["_id"]).ok_or("Created session has no usable _id")?;
                Ok(
                    Passed::new(format!("Chat session created successfully with ID: {id}"))
                        .details(format!(
                            "Level: {}, Topic: {}",
                            value_text(&body["level"]),
                            value_text(&body["topic"])
                        )),
                )
            })
            .await;

        if let Some(id) = outcome.passed_body().and_then(|body| id_string(&body["_id"])) {
            debug!("Captured chat session id {}", id);
            state.capture_session_id(id);
        }

        outcome.result
    }

    async fn history(&self, verifier: &ContractVerifier, state: &RunState) -> CheckResult {
        let name = CheckGroup::ChatSessions.check_name(GET_HISTORY);
        if let Some(skipped) = verifier.short_circuit(&name, state, HISTORY_REQUIRES) {
            return skipped;
        }
        let session_id = state.session_id().unwrap_or_default();

        let check = EndpointCheck::new(name, Endpoint::ChatHistory)
            .query("sessionId", session_id)
            .query("limit", self.history_limit);

        verifier
            .check_endpoint(check, |body| {
                let turns = body.as_array().map(Vec::len).unwrap_or_default();
                Ok(
                    Passed::new(format!("Chat history retrieved successfully ({turns} turns)"))
                        .details(format!("Session ID: {session_id}")),
                )
            })
            .await
            .result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let check = ChatCheck::default();
        assert_eq!(check.level, "B1");
        assert_eq!(check.topic, "daily_conversation");
        assert_eq!(check.history_limit, 10);
    }
}
