//! Database connection check
//!
//! Group 3: fetch the registered user's profile back from storage.

use tracing::info;

use super::{id_string, value_text};
use crate::contract::Endpoint;
use crate::executor::{ContractVerifier, EndpointCheck, Passed};
use crate::models::{CheckGroup, CheckResult, Prerequisite, RunState};

pub(super) const PROFILE_FETCH: &str = "Profile Fetch";
pub(super) const REQUIRES: &[Prerequisite] = &[Prerequisite::UserId];

/// Profile round-trip check
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileCheck;

impl ProfileCheck {
    pub async fn run(&self, verifier: &ContractVerifier, state: &RunState) -> Vec<CheckResult> {
        info!("Running Database Connection check");
        let name = CheckGroup::DatabaseConnection.check_name(PROFILE_FETCH);

        if let Some(skipped) = verifier.short_circuit(&name, state, REQUIRES) {
            return vec![skipped];
        }
        let user_id = state.user_id().unwrap_or_default();

        let check = EndpointCheck::new(name, Endpoint::Profile).query("userId", user_id);

        let outcome = verifier
            .check_endpoint(check, |body| {
                let id = id_string(&body["_id"]);
                if id.as_deref() != Some(user_id) {
                    return Err(format!(
                        "Profile _id {} does not match user id {}",
                        value_text(&body["_id"]),
                        user_id
                    ));
                }
                Ok(
                    Passed::new("Database connection working - user profile retrieved").details(
                        format!(
                            "Retrieved user: {} ({})",
                            value_text(&body["name"]),
                            value_text(&body["email"])
                        ),
                    ),
                )
            })
            .await;

        vec![outcome.result]
    }
}
