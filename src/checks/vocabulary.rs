//! Vocabulary SRS checks
//!
//! Group 5: list due cards, then review the first one.

use serde_json::json;
use tracing::{debug, info};

use super::{id_string, sample, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult, DueCard, Prerequisite, RunState};

pub(super) const GET_DUE_CARDS: &str = "Get Due Cards";
pub(super) const REVIEW_CARD: &str = "Review Card";
pub(super) const DUE_REQUIRES: &[Prerequisite] = &[Prerequisite::UserId];
pub(super) const REVIEW_REQUIRES: &[Prerequisite] = &[Prerequisite::UserId, Prerequisite::DueCard];

/// Due-card listing and review check
#[derive(Clone, Debug)]
pub struct VocabularyCheck {
    pub due_limit: u32,
    pub review_result: String,
}

impl Default for VocabularyCheck {
    fn default() -> Self {
        Self {
            due_limit: 5,
            review_result: "good".to_string(),
        }
    }
}

impl VocabularyCheck {
    pub async fn run(&self, verifier: &ContractVerifier, state: &mut RunState) -> Vec<CheckResult> {
        info!("Running Vocabulary SRS checks");
        vec![
            self.due_cards(verifier, state).await,
            self.review(verifier, state).await,
        ]
    }

    async fn due_cards(&self, verifier: &ContractVerifier, state: &mut RunState) -> CheckResult {
        let name = CheckGroup::VocabularySrs.check_name(GET_DUE_CARDS);
        if let Some(skipped) = verifier.short_circuit(&name, state, DUE_REQUIRES) {
            return skipped;
        }
        let user_id = state.user_id().unwrap_or_default().to_string();

        let check = EndpointCheck::new(name, Endpoint::DueCards)
            .query("userId", &user_id)
            .query("limit", self.due_limit);

        let outcome = verifier
            .check_endpoint(check, |body| {
                let count = body.as_array().map(Vec::len).unwrap_or_default();
                Ok(Passed::new(format!("Retrieved {count} vocabulary cards"))
                    .details(format!("Sample cards: {}", sample(body, "term", 3))))
            })
            .await;

        let first = outcome
            .passed_body()
            .and_then(|body| body.as_array())
            .and_then(|cards| cards.first());
        if let Some(card) = first {
            if let Some(id) = id_string(&card["_id"]) {
                debug!("Captured due card {}", id);
                state.capture_due_card(DueCard {
                    id,
                    term: value_text(&card["term"]),
                });
            }
        }

        outcome.result
    }

    async fn review(&self, verifier: &ContractVerifier, state: &RunState) -> CheckResult {
        let name = CheckGroup::VocabularySrs.check_name(REVIEW_CARD);
        if let Some(skipped) = verifier.short_circuit(&name, state, REVIEW_REQUIRES) {
            return skipped;
        }
        let (Some(user_id), Some(card)) = (state.user_id(), state.due_card()) else {
            return CheckResult::fail(name, Prerequisite::DueCard.missing_message());
        };

        let check = EndpointCheck::new(name, Endpoint::ReviewCard).json(json!({
            "userId": user_id,
            "cardId": card.id,
            "result": self.review_result,
        }));

        verifier
            .check_endpoint(check, |body| {
                if body["success"].as_bool() != Some(true) {
                    return Err(format!(
                        "Review was not successful (success = {})",
                        body["success"]
                    ));
                }
                Ok(
                    Passed::new(format!("Card review successful for '{}'", card.term))
                        .details(format!("Next due: {}", value_text(&body["nextDue"]))),
                )
            })
            .await
            .result
    }
}
