//! Endpoint checks for the tutoring API
//!
//! Thirteen checks in six groups, run in dependency order.
//!
//! ## Check Groups
//!
//! ### 1. AI Tutor
//! - Basic Grammar Correction (A2)
//! - B1 Level Conversation
//! - C1 Advanced Level
//!
//! ### 2. Authentication
//! - Register, Login, Invalid Login
//!
//! ### 3. Database Connection
//! - Profile Fetch (needs user id)
//!
//! ### 4. Chat Sessions
//! - Create Session (needs user id)
//! - Get History (needs session id)
//!
//! ### 5. Vocabulary SRS
//! - Get Due Cards (needs user id)
//! - Review Card (needs a due card)
//!
//! ### 6. Additional
//! - Get Lessons
//! - Pronunciation Analysis (needs user id)

mod additional;
mod auth;
mod chat;
mod profile;
mod tutor;
mod vocabulary;

pub use additional::AdditionalCheck;
pub use auth::AuthCheck;
pub use chat::ChatCheck;
pub use profile::ProfileCheck;
pub use tutor::TutorCheck;
pub use vocabulary::VocabularyCheck;

use serde_json::Value;

use crate::contract::Endpoint;
use crate::executor::ContractVerifier;
use crate::models::{CheckGroup, CheckResult, Prerequisite, RunState};

/// Run one group of checks with its default inputs
pub async fn run_group(
    group: CheckGroup,
    verifier: &ContractVerifier,
    state: &mut RunState,
) -> Vec<CheckResult> {
    match group {
        CheckGroup::Tutor => TutorCheck::default().run(verifier).await,
        CheckGroup::Authentication => AuthCheck::default().run(verifier, state).await,
        CheckGroup::DatabaseConnection => ProfileCheck.run(verifier, state).await,
        CheckGroup::ChatSessions => ChatCheck::default().run(verifier, state).await,
        CheckGroup::VocabularySrs => VocabularyCheck::default().run(verifier, state).await,
        CheckGroup::Additional => AdditionalCheck::default().run(verifier, state).await,
    }
}

/// A check as it will run, for listings
#[derive(Clone, Debug)]
pub struct PlannedCheck {
    pub group: CheckGroup,
    pub name: String,
    pub endpoint: Endpoint,
    pub requires: &'static [Prerequisite],
}

impl PlannedCheck {
    fn new(
        group: CheckGroup,
        check: &str,
        endpoint: Endpoint,
        requires: &'static [Prerequisite],
    ) -> Self {
        Self {
            group,
            name: group.check_name(check),
            endpoint,
            requires,
        }
    }
}

/// All checks in execution order
pub fn planned_checks() -> Vec<PlannedCheck> {
    let mut plan: Vec<PlannedCheck> = TutorCheck::default()
        .cases
        .iter()
        .map(|case| PlannedCheck::new(CheckGroup::Tutor, &case.name, Endpoint::Tutor, &[]))
        .collect();

    plan.extend([
        PlannedCheck::new(CheckGroup::Authentication, auth::REGISTER, Endpoint::Register, &[]),
        PlannedCheck::new(CheckGroup::Authentication, auth::LOGIN, Endpoint::Login, &[]),
        PlannedCheck::new(
            CheckGroup::Authentication,
            auth::INVALID_LOGIN,
            Endpoint::LoginRejected,
            &[],
        ),
        PlannedCheck::new(
            CheckGroup::DatabaseConnection,
            profile::PROFILE_FETCH,
            Endpoint::Profile,
            profile::REQUIRES,
        ),
        PlannedCheck::new(
            CheckGroup::ChatSessions,
            chat::CREATE_SESSION,
            Endpoint::CreateSession,
            chat::CREATE_REQUIRES,
        ),
        PlannedCheck::new(
            CheckGroup::ChatSessions,
            chat::GET_HISTORY,
            Endpoint::ChatHistory,
            chat::HISTORY_REQUIRES,
        ),
        PlannedCheck::new(
            CheckGroup::VocabularySrs,
            vocabulary::GET_DUE_CARDS,
            Endpoint::DueCards,
            vocabulary::DUE_REQUIRES,
        ),
        PlannedCheck::new(
            CheckGroup::VocabularySrs,
            vocabulary::REVIEW_CARD,
            Endpoint::ReviewCard,
            vocabulary::REVIEW_REQUIRES,
        ),
        PlannedCheck::new(CheckGroup::Additional, additional::GET_LESSONS, Endpoint::Lessons, &[]),
        PlannedCheck::new(
            CheckGroup::Additional,
            additional::PRONUNCIATION,
            Endpoint::Pronunciation,
            additional::PRONUNCIATION_REQUIRES,
        ),
    ]);

    plan
}

/// Identifier carried in a JSON value; ids may arrive as strings or numbers
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human-readable text of a JSON value, without quotes around strings
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown".to_string(),
        other => other.to_string(),
    }
}

/// First `limit` characters of `text`, with an ellipsis
pub(crate) fn preview(text: &str, limit: usize) -> String {
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}...")
}

/// `field` of each of the first `count` list items, for sample details
pub(crate) fn sample(body: &Value, field: &str, count: usize) -> String {
    let items: Vec<String> = body
        .as_array()
        .map(|items| {
            items
                .iter()
                .take(count)
                .map(|item| value_text(item.get(field).unwrap_or(&Value::Null)))
                .collect()
        })
        .unwrap_or_default();
    format!("[{}]", items.join(", "))
}
